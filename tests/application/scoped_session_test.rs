use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::FutureExt;

use yavin::application::ports::{RepositoryError, SessionProvider, with_scoped_session};

struct CountingSession {
    releases: Arc<AtomicUsize>,
}

impl Drop for CountingSession {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct CountingProvider {
    acquisitions: AtomicUsize,
    releases: Arc<AtomicUsize>,
    unavailable: bool,
}

impl CountingProvider {
    fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for CountingProvider {
    type Session = CountingSession;

    async fn acquire(&self) -> Result<CountingSession, RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::ConnectionFailed("refused".to_string()));
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(CountingSession {
            releases: Arc::clone(&self.releases),
        })
    }
}

#[tokio::test]
async fn given_successful_work_when_scoped_then_session_released_once() {
    let provider = CountingProvider::default();

    let result: Result<u32, RepositoryError> =
        with_scoped_session(&provider, |_session| async { Ok(7) }.boxed()).await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 1);
    assert_eq!(provider.releases(), 1);
}

#[tokio::test]
async fn given_failing_work_when_scoped_then_error_returned_and_session_released_once() {
    let provider = CountingProvider::default();

    let result: Result<u32, RepositoryError> = with_scoped_session(&provider, |_session| {
        async { Err(RepositoryError::QueryFailed("syntax error".to_string())) }.boxed()
    })
    .await;

    assert!(matches!(result, Err(RepositoryError::QueryFailed(_))));
    assert_eq!(provider.releases(), 1);
}

fn explode() -> Result<(), RepositoryError> {
    panic!("handler blew up")
}

#[tokio::test]
async fn given_work_that_panics_when_scoped_then_session_still_released() {
    let provider = Arc::new(CountingProvider::default());
    let scoped = Arc::clone(&provider);

    let outcome = tokio::spawn(async move {
        let _: Result<(), RepositoryError> = with_scoped_session(&*scoped, |_session| {
            async { explode() }.boxed()
        })
        .await;
    })
    .await;

    assert!(outcome.unwrap_err().is_panic());
    assert_eq!(provider.releases(), 1);
}

#[tokio::test]
async fn given_unavailable_provider_when_scoped_then_work_never_runs() {
    let provider = CountingProvider::unavailable();
    let called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&called);

    let result: Result<(), RepositoryError> = with_scoped_session(&provider, move |_session| {
        async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    })
    .await;

    assert!(matches!(result, Err(RepositoryError::ConnectionFailed(_))));
    assert!(!called.load(Ordering::SeqCst));
    assert_eq!(provider.releases(), 0);
}

#[tokio::test]
async fn given_concurrent_scopes_when_all_finish_then_every_session_released_once() {
    let provider = CountingProvider::default();

    let scopes = (0..8).map(|i| {
        with_scoped_session(&provider, move |_session| {
            async move {
                tokio::task::yield_now().await;
                if i % 2 == 0 {
                    Ok(i)
                } else {
                    Err(RepositoryError::QueryFailed(format!("scope {i}")))
                }
            }
            .boxed()
        })
    });
    let results: Vec<Result<i32, RepositoryError>> = futures::future::join_all(scopes).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
    assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 8);
    assert_eq!(provider.releases(), 8);
}
