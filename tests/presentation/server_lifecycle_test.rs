use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::instrument::WithSubscriber;
use tracing_subscriber::fmt::MakeWriter;

use yavin::presentation::serve;

use crate::helpers::test_state;

#[tokio::test]
async fn given_running_server_when_shutdown_requested_then_serve_returns_cleanly() {
    let state = test_state(&[("APP_NAME", "Lifecycle"), ("APP_VERSION", "1.2.3")]);
    let sessions = state.sessions.clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, state, async move {
        shutdown_rx.await.ok();
    }));

    let root: Value = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(root["message"], "Lifecycle backend running");
    assert_eq!(root["version"], "1.2.3");

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();

    assert!(result.is_ok());
    assert!(sessions.pool().is_closed());
}

#[tokio::test]
async fn given_stopped_server_when_connecting_then_connection_is_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    serve(listener, test_state(&[]), async {}).await.unwrap();

    assert!(reqwest::get(format!("http://{addr}/health")).await.is_err());
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn given_server_run_when_it_starts_and_stops_then_lifecycle_is_logged_in_order() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let state = test_state(&[("APP_NAME", "Lifecycle"), ("APP_VERSION", "1.2.3")]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    serve(listener, state, async {})
        .with_subscriber(subscriber)
        .await
        .unwrap();

    let output = logs.contents();
    let started = output
        .find("Starting Lifecycle v1.2.3")
        .expect("startup was not logged");
    let stopped = output
        .find("Shutting down application")
        .expect("shutdown was not logged");
    assert!(started < stopped);
    assert!(output.contains(&addr.to_string()));
}
