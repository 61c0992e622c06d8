//! # Mock Framework & Testing Guide
//!
//! `MockClient<B>` hands out the same [`ServiceClient<B>`] the production code uses,
//! but no backend runs behind it. Each incoming request is answered by the next
//! queued expectation, so tests decide exactly what a collaborator returns and can
//! inject failures that are hard to reproduce with the real in-memory services.
//!
//! ## When to use Mocks vs Real Services
//!
//! | Feature | MockClient | In-memory service |
//! |---------|------------|-------------------|
//! | **State** | None (scripted replies) | Real records |
//! | **Call checking** | Every request is matched in order | None |
//! | **Error Injection** | Easy (`return_err`) | Only what the service rejects |
//! | **Use Case** | Asserting what the resolver asks for | End-to-end behaviour |
//!
//! Backend-specific expectation builders (for example
//! [`MockClient::expect_list_actors`](crate::orchestrator::mock)) are layered on top of
//! the generic [`MockClient::expect`].
//!
//! ```ignore
//! let mut mock = MockClient::<MemoryOrchestrator>::new();
//! mock.expect_get_actor("actor_1").return_ok(None);
//!
//! let resolver = ActorResolver::new(mock.client());
//! let err = resolver.resolve(query, &env).await.unwrap_err();
//!
//! mock.verify(); // every expectation consumed, no unexpected request
//! ```

use super::core::{Backend, ServiceClient};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Handles one request. Returning `Err` records a mismatch reported by
/// [`MockClient::verify`].
pub type Expectation<B> =
    Box<dyn FnOnce(<B as Backend>::Request) -> Result<(), String> + Send + 'static>;

/// A mock service with expectation tracking for fluent testing.
pub struct MockClient<B: Backend> {
    client: ServiceClient<B>,
    expectations: Arc<Mutex<VecDeque<Expectation<B>>>>,
    failures: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<B: Backend> Default for MockClient<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> MockClient<B> {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<B::Request>(100);
        let expectations: Arc<Mutex<VecDeque<Expectation<B>>>> = Arc::default();
        let failures: Arc<Mutex<Vec<String>>> = Arc::default();

        let queue = expectations.clone();
        let recorded = failures.clone();
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue.lock().unwrap().pop_front();
                let outcome = match next {
                    Some(expectation) => expectation(request),
                    // Dropping the request drops its responder; the caller sees `Dropped`.
                    None => Err(format!("Unexpected request: {request:?}")),
                };
                if let Err(message) = outcome {
                    recorded.lock().unwrap().push(message);
                }
            }
        });

        Self {
            client: ServiceClient::new(sender),
            expectations,
            failures,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ServiceClient<B> {
        self.client.clone()
    }

    /// Queues a raw expectation.
    pub fn expect(
        &mut self,
        expectation: impl FnOnce(B::Request) -> Result<(), String> + Send + 'static,
    ) {
        self.expectations
            .lock()
            .unwrap()
            .push_back(Box::new(expectation));
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            panic!("Mock expectation mismatch: {}", failures.join("; "));
        }
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{Response, UpstreamError};

    #[derive(Debug)]
    enum EchoRequest {
        Echo {
            text: String,
            respond_to: Response<String>,
        },
    }

    struct Echo;

    impl Backend for Echo {
        type Request = EchoRequest;
        const NAME: &'static str = "echo";

        fn handle(&mut self, request: EchoRequest) {
            let EchoRequest::Echo { text, respond_to } = request;
            let _ = respond_to.send(Ok(text));
        }
    }

    #[tokio::test]
    async fn test_mock_answers_from_queue() {
        let mut mock = MockClient::<Echo>::new();
        mock.expect(|request| {
            let EchoRequest::Echo { text, respond_to } = request;
            let _ = respond_to.send(Ok(format!("scripted {text}")));
            Ok(())
        });

        let reply = mock
            .client()
            .call(|respond_to| EchoRequest::Echo {
                text: "hi".into(),
                respond_to,
            })
            .await
            .unwrap();
        assert_eq!(reply, "scripted hi");
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected request")]
    async fn test_unexpected_request_fails_verify() {
        let mock = MockClient::<Echo>::new();
        let err = mock
            .client()
            .call(|respond_to| EchoRequest::Echo {
                text: "hi".into(),
                respond_to,
            })
            .await
            .unwrap_err();
        assert_eq!(err, UpstreamError::Dropped);
        mock.verify();
    }
}
