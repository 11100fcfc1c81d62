#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
}
