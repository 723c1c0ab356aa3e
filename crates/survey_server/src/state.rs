//! Shared request state and the async-to-blocking store bridge.
//!
//! # Invariants
//! - The SQLite connection is only touched on the blocking thread pool.
//! - Each store call owns a cancellation token that fires when the request
//!   future is dropped.
//! - A panic in one store call does not lock out later requests; each SQLite
//!   statement commits or rolls back on its own.

use crate::api::error::ApiError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};
use survey_core::{CancellationToken, RepoResult, SqliteSurveyRepository, SurveyService};

pub type StoreService<'conn> = SurveyService<SqliteSurveyRepository<'conn>>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` against the survey service on the blocking pool.
    pub async fn with_service<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&StoreService<'_>, &CancellationToken) -> RepoResult<T> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let db = Arc::clone(&self.db);

        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            let service = SurveyService::new(SqliteSurveyRepository::try_new(&conn)?);
            op(&service, &cancel).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use std::sync::{mpsc, Arc};
    use std::time::Duration;
    use survey_core::db::open_db_in_memory;
    use survey_core::{RepoError, SurveyData};

    fn state() -> AppState {
        AppState::new(open_db_in_memory().unwrap())
    }

    #[tokio::test]
    async fn dropped_request_cancels_its_store_call() {
        let state = state();
        let (observed_tx, observed_rx) = mpsc::channel();

        let held = state.db.lock().unwrap();
        let mut request = Box::pin(state.with_service(move |service, cancel| {
            let result = service.add_new_survey(SurveyData::new("late", ""), cancel);
            let _ = observed_tx.send((
                cancel.is_cancelled(),
                matches!(result, Err(RepoError::Cancelled)),
            ));
            result.map(|_| ())
        }));

        // One poll hands the call to the blocking pool, where it waits on the lock.
        tokio::select! {
            biased;
            _ = &mut request => panic!("store call finished while the lock was held"),
            _ = std::future::ready(()) => {}
        }
        drop(request);
        drop(held);

        let observed = tokio::task::spawn_blocking(move || {
            observed_rx.recv_timeout(Duration::from_secs(5))
        })
        .await
        .unwrap()
        .expect("store call should run after the lock is released");
        assert_eq!(observed, (true, true));

        let surveys = state
            .with_service(|service, cancel| service.get_surveys(cancel))
            .await
            .unwrap();
        assert!(surveys.is_empty());
    }

    #[tokio::test]
    async fn poisoned_lock_does_not_block_later_requests() {
        let state = state();
        let db = Arc::clone(&state.db);
        let poisoned = std::thread::spawn(move || {
            let _conn = db.lock().unwrap();
            panic!("store call panicked");
        })
        .join();
        assert!(poisoned.is_err());
        assert!(state.db.is_poisoned());

        let created = state
            .with_service(|service, cancel| {
                service.add_new_survey(SurveyData::new("after panic", ""), cancel)
            })
            .await
            .unwrap();
        let surveys = state
            .with_service(|service, cancel| service.get_surveys(cancel))
            .await
            .unwrap();
        assert_eq!(surveys, vec![created]);
    }
}
