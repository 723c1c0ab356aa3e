//! Survey repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `surveys` and `survey_templates` tables.
//! - Translate SQLite constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths reject nil identities before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `delete` is idempotent; deleting an absent identity is not an error.
//! - `list` is ordered by identity ascending.

use crate::cancel::{ensure_active, Cancelled};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::diff::{Diffable, FieldDescriptor};
use crate::model::survey::{EntityError, Survey, SurveyId, SurveyRecord};
use crate::model::template::SurveyTemplate;
use log::debug;
use rusqlite::{params, types::ToSql, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const REQUIRED_COLUMNS: [&str; 3] = ["survey_id", "name", "description"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for survey persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// No row exists for the identity.
    NotFound(SurveyId),
    /// A row with the identity already exists.
    Conflict(SurveyId),
    /// The caller's cancellation token fired before completion.
    Cancelled,
    /// The record failed constructor invariants.
    InvalidArgument(EntityError),
    /// Persisted state could not be decoded into a record.
    InvalidData(String),
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "survey not found: {id}"),
            Self::Conflict(id) => write!(f, "survey already exists: {id}"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::InvalidArgument(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted survey data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntityError> for RepoError {
    fn from(value: EntityError) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<Cancelled> for RepoError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Survey-shaped record persisted in its own table.
pub trait SurveyTable: SurveyRecord + Diffable {
    /// Backing table name.
    const TABLE: &'static str;

    /// Rebuilds a record from stored columns.
    fn from_columns(
        survey_id: SurveyId,
        name: String,
        description: String,
    ) -> Result<Self, EntityError>;

    /// Rejects records that cannot be persisted.
    fn ensure_identity(&self) -> Result<(), EntityError> {
        if self.survey_id().is_nil() {
            return Err(EntityError::InvalidArgument("survey id must not be nil"));
        }
        Ok(())
    }
}

impl SurveyTable for Survey {
    const TABLE: &'static str = "surveys";

    fn from_columns(
        survey_id: SurveyId,
        name: String,
        description: String,
    ) -> Result<Self, EntityError> {
        Survey::with_id(survey_id, name, description)
    }
}

impl SurveyTable for SurveyTemplate {
    const TABLE: &'static str = "survey_templates";

    fn from_columns(
        survey_id: SurveyId,
        name: String,
        description: String,
    ) -> Result<Self, EntityError> {
        SurveyTemplate::with_id(survey_id, name, description)
    }
}

/// Repository interface for CRUD over one survey-shaped table.
///
/// Every operation observes `cancel` before touching the store.
pub trait SurveyRepository<E> {
    /// Inserts a record with its caller-supplied identity and returns the
    /// stored state.
    fn add(&self, entity: &E, cancel: &CancellationToken) -> RepoResult<E>;
    /// Replaces every writable column of the row keyed by identity.
    fn update(&self, entity: &E, cancel: &CancellationToken) -> RepoResult<()>;
    /// Replaces only the named writable columns of the row keyed by identity.
    fn update_fields(
        &self,
        entity: &E,
        fields: &[&str],
        cancel: &CancellationToken,
    ) -> RepoResult<()>;
    /// Removes the row keyed by identity, if any.
    fn delete(&self, id: SurveyId, cancel: &CancellationToken) -> RepoResult<()>;
    /// Gets one record, or `None` when absent.
    fn get(&self, id: SurveyId, cancel: &CancellationToken) -> RepoResult<Option<E>>;
    /// Lists every record ordered by identity ascending.
    fn list(&self, cancel: &CancellationToken) -> RepoResult<Vec<E>>;
}

/// SQLite-backed repository for one survey-shaped table.
pub struct SqliteEntityRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

pub type SqliteSurveyRepository<'conn> = SqliteEntityRepository<'conn, Survey>;
pub type SqliteSurveyTemplateRepository<'conn> = SqliteEntityRepository<'conn, SurveyTemplate>;

impl<'conn, E: SurveyTable> SqliteEntityRepository<'conn, E> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry the backing table.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, E::TABLE)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    fn fetch(&self, id: SurveyId) -> RepoResult<Option<E>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT survey_id, name, description
             FROM {}
             WHERE survey_id = ?1;",
            E::TABLE
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_row(row)?));
        }

        Ok(None)
    }

    fn exists(&self, id: SurveyId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE survey_id = ?1);",
                E::TABLE
            ),
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl<E: SurveyTable> SurveyRepository<E> for SqliteEntityRepository<'_, E> {
    fn add(&self, entity: &E, cancel: &CancellationToken) -> RepoResult<E> {
        ensure_active(cancel)?;
        entity.ensure_identity()?;

        let id = entity.survey_id();
        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO {} (survey_id, name, description) VALUES (?1, ?2, ?3);",
                E::TABLE
            ),
            params![id.to_string(), entity.name(), entity.description()],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => return Err(RepoError::Conflict(id)),
            Err(err) => return Err(err.into()),
        }
        debug!("event=survey_add module=repo status=ok table={}", E::TABLE);

        self.fetch(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted row `{id}` missing from {}", E::TABLE))
        })
    }

    fn update(&self, entity: &E, cancel: &CancellationToken) -> RepoResult<()> {
        ensure_active(cancel)?;
        entity.ensure_identity()?;

        let id = entity.survey_id();
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET
                    name = ?1,
                    description = ?2
                 WHERE survey_id = ?3;",
                E::TABLE
            ),
            params![entity.name(), entity.description(), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=survey_update module=repo status=ok table={}", E::TABLE);
        Ok(())
    }

    fn update_fields(
        &self,
        entity: &E,
        fields: &[&str],
        cancel: &CancellationToken,
    ) -> RepoResult<()> {
        ensure_active(cancel)?;
        entity.ensure_identity()?;

        let id = entity.survey_id();
        let mut columns: Vec<&'static FieldDescriptor<E>> = Vec::with_capacity(fields.len());
        for name in fields {
            if let Some(field) = E::field(name) {
                if !columns.iter().any(|column| column.name == field.name) {
                    columns.push(field);
                }
            }
        }

        if columns.is_empty() {
            if !self.exists(id)? {
                return Err(RepoError::NotFound(id));
            }
            return Ok(());
        }

        let id_text = id.to_string();
        let mut assignments = Vec::with_capacity(columns.len());
        let mut bind_values: Vec<&dyn ToSql> = Vec::with_capacity(columns.len() + 1);
        for (index, column) in columns.iter().enumerate() {
            assignments.push(format!("{} = ?{}", column.name, index + 1));
            bind_values.push((column.value)(entity));
        }
        bind_values.push(&id_text);

        let sql = format!(
            "UPDATE {} SET {} WHERE survey_id = ?{};",
            E::TABLE,
            assignments.join(", "),
            bind_values.len()
        );
        let changed = self.conn.execute(&sql, bind_values.as_slice())?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!(
            "event=survey_update module=repo status=ok table={} fields={}",
            E::TABLE,
            columns
                .iter()
                .map(|column| column.name)
                .collect::<Vec<_>>()
                .join(",")
        );
        Ok(())
    }

    fn delete(&self, id: SurveyId, cancel: &CancellationToken) -> RepoResult<()> {
        ensure_active(cancel)?;

        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE survey_id = ?1;", E::TABLE),
            [id.to_string()],
        )?;

        debug!(
            "event=survey_delete module=repo status=ok table={} removed={removed}",
            E::TABLE
        );
        Ok(())
    }

    fn get(&self, id: SurveyId, cancel: &CancellationToken) -> RepoResult<Option<E>> {
        ensure_active(cancel)?;
        let entity = self.fetch(id)?;
        ensure_active(cancel)?;
        Ok(entity)
    }

    fn list(&self, cancel: &CancellationToken) -> RepoResult<Vec<E>> {
        ensure_active(cancel)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT survey_id, name, description
             FROM {}
             ORDER BY survey_id ASC;",
            E::TABLE
        ))?;
        let mut rows = stmt.query([])?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(parse_row(row)?);
        }

        ensure_active(cancel)?;
        Ok(entities)
    }
}

fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    for column in REQUIRED_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn parse_row<E: SurveyTable>(row: &Row<'_>) -> RepoResult<E> {
    let id_text: String = row.get("survey_id")?;
    let survey_id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{id_text}` in {}.survey_id",
            E::TABLE
        ))
    })?;

    E::from_columns(survey_id, row.get("name")?, row.get("description")?)
        .map_err(|err| RepoError::InvalidData(format!("{err} in {}", E::TABLE)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}
