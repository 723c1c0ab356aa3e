//! Field diff utility for partial updates.
//!
//! # Responsibility
//! - Report which writable fields differ between two views of one record.
//! - Copy a named subset of writable fields from one view onto another.
//!
//! # Invariants
//! - Each diffable type publishes its writable fields as a static
//!   descriptor table; there is no runtime introspection.
//! - Fields are compared by value equality.
//! - Requested names that are not writable fields are skipped.
//! - Every writable field binds directly as a storage column value.

use rusqlite::types::ToSql;

/// Accessor pair for one writable field of `T`.
pub struct FieldDescriptor<T> {
    /// Field name as exposed to callers and used as the storage column name.
    pub name: &'static str,
    /// Returns `true` when both records hold equal values for this field.
    pub eq: fn(&T, &T) -> bool,
    /// Overwrites the first record's value with the second record's value.
    pub apply: fn(&mut T, &T),
    /// Borrows the record's value for binding into the field's column.
    pub value: fn(&T) -> &dyn ToSql,
}

/// Records that expose a static table of writable fields.
pub trait Diffable: Sized + 'static {
    /// Writable fields in declaration order.
    const FIELDS: &'static [FieldDescriptor<Self>];

    /// Looks up one writable field by name.
    fn field(name: &str) -> Option<&'static FieldDescriptor<Self>> {
        Self::FIELDS.iter().find(|field| field.name == name)
    }
}

/// Implements [`Diffable`] for a record from a list of writable field names.
macro_rules! impl_diffable {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::model::diff::Diffable for $ty {
            const FIELDS: &'static [$crate::model::diff::FieldDescriptor<Self>] = &[
                $(
                    $crate::model::diff::FieldDescriptor {
                        name: stringify!($field),
                        eq: |reference: &$ty, candidate: &$ty| {
                            reference.$field == candidate.$field
                        },
                        apply: |reference: &mut $ty, candidate: &$ty| {
                            reference.$field.clone_from(&candidate.$field)
                        },
                        value: {
                            fn value(record: &$ty) -> &dyn ::rusqlite::types::ToSql {
                                &record.$field
                            }
                            value
                        },
                    },
                )+
            ];
        }
    };
}

pub(crate) use impl_diffable;

/// Returns the names of every writable field of `T`.
pub fn writable_fields<T: Diffable>() -> Vec<&'static str> {
    T::FIELDS.iter().map(|field| field.name).collect()
}

/// Returns the writable fields whose values differ, in declaration order.
pub fn compare<T: Diffable>(reference: &T, candidate: &T) -> Vec<&'static str> {
    T::FIELDS
        .iter()
        .filter(|field| !(field.eq)(reference, candidate))
        .map(|field| field.name)
        .collect()
}

/// Returns the subset of `fields` whose values differ, in caller order.
///
/// Unknown names are skipped and repeated names are reported once.
pub fn compare_fields<T, S>(reference: &T, candidate: &T, fields: &[S]) -> Vec<&'static str>
where
    T: Diffable,
    S: AsRef<str>,
{
    let mut changed: Vec<&'static str> = Vec::with_capacity(fields.len());
    for name in fields {
        let Some(field) = T::field(name.as_ref()) else {
            continue;
        };
        if changed.contains(&field.name) {
            continue;
        }
        if !(field.eq)(reference, candidate) {
            changed.push(field.name);
        }
    }
    changed
}

/// Copies the candidate's values for `fields` onto `reference` in place.
///
/// Unknown names are skipped.
pub fn apply_fields<T, S>(reference: &mut T, candidate: &T, fields: &[S])
where
    T: Diffable,
    S: AsRef<str>,
{
    for name in fields {
        if let Some(field) = T::field(name.as_ref()) {
            (field.apply)(reference, candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_fields, compare, compare_fields, writable_fields, Diffable};
    use rusqlite::types::{ToSqlOutput, Value, ValueRef};

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        id: u32,
        title: String,
        weight: Option<f64>,
    }

    impl_diffable!(Sample { title, weight });

    fn sample() -> Sample {
        Sample {
            id: 7,
            title: "first".to_string(),
            weight: Some(1.5),
        }
    }

    #[test]
    fn writable_fields_follow_declaration_order() {
        assert_eq!(writable_fields::<Sample>(), vec!["title", "weight"]);
    }

    #[test]
    fn compare_with_equal_copy_is_empty() {
        let reference = sample();
        assert!(compare(&reference, &reference).is_empty());
        assert!(compare(&reference, &reference.clone()).is_empty());
    }

    #[test]
    fn compare_ignores_non_writable_fields() {
        let reference = sample();
        let mut candidate = sample();
        candidate.id = 99;
        assert!(compare(&reference, &candidate).is_empty());
    }

    #[test]
    fn compare_fields_keeps_caller_order_and_skips_unknown_names() {
        let reference = sample();
        let mut candidate = sample();
        candidate.title = "second".to_string();
        candidate.weight = None;

        let changed = compare_fields(&reference, &candidate, &["weight", "id", "title", "weight"]);
        assert_eq!(changed, vec!["weight", "title"]);
    }

    #[test]
    fn apply_fields_copies_only_named_fields() {
        let mut reference = sample();
        let candidate = Sample {
            id: 1,
            title: "other".to_string(),
            weight: None,
        };

        apply_fields(&mut reference, &candidate, &["weight", "missing"]);
        assert_eq!(reference.id, 7);
        assert_eq!(reference.title, "first");
        assert_eq!(reference.weight, None);
    }

    #[test]
    fn value_accessor_borrows_each_writable_field() {
        let record = sample();
        let title = Sample::field("title").expect("title is writable");
        assert_eq!(
            (title.value)(&record).to_sql().unwrap(),
            ToSqlOutput::Borrowed(ValueRef::Text(b"first"))
        );

        let mut unweighted = sample();
        unweighted.weight = None;
        let weight = Sample::field("weight").expect("weight is writable");
        assert_eq!(
            (weight.value)(&unweighted).to_sql().unwrap(),
            ToSqlOutput::Owned(Value::Null)
        );
    }
}
