use async_trait::async_trait;
use futures::future::BoxFuture;

use super::RepositoryError;

/// Source of scoped database sessions.
///
/// A session is released when it is dropped.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: Send;

    async fn acquire(&self) -> Result<Self::Session, RepositoryError>;
}

/// Acquires a session, runs `work` with it and releases it once `work`
/// completes, fails or unwinds.
pub async fn with_scoped_session<P, T, E, F>(provider: &P, work: F) -> Result<T, E>
where
    P: SessionProvider,
    F: for<'s> FnOnce(&'s mut P::Session) -> BoxFuture<'s, Result<T, E>>,
    E: From<RepositoryError>,
{
    let mut session = provider.acquire().await?;
    let result = work(&mut session).await;
    drop(session);
    result
}
