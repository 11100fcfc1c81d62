use std::ops::{Deref, DerefMut};
use std::time::Instant;

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};
use tracing::debug;
use uuid::Uuid;

/// A scoped handle to one pooled Postgres connection.
///
/// The connection goes back to the pool when the session is dropped, so it
/// is released exactly once on every exit path of the owning scope.
pub struct DbSession {
    id: Uuid,
    opened_at: Instant,
    connection: PoolConnection<Postgres>,
}

impl DbSession {
    pub(crate) fn new(connection: PoolConnection<Postgres>) -> Self {
        let id = Uuid::new_v4();
        debug!(session_id = %id, "Database session opened");

        Self {
            id,
            opened_at: Instant::now(),
            connection,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ends the session before the end of its scope.
    pub fn close(self) {
        drop(self);
    }
}

impl Deref for DbSession {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}

impl Drop for DbSession {
    fn drop(&mut self) {
        debug!(
            session_id = %self.id,
            elapsed_ms = self.opened_at.elapsed().as_millis() as u64,
            "Database session closed"
        );
    }
}
