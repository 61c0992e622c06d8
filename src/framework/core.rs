//! # Core Service Framework
//!
//! This module defines the generic building blocks used to run the in-memory
//! collaborators (orchestration API, storage engine) as actors.
//!
//! ## Key Types
//!
//! - [`Backend`]: The trait a service's owned state implements.
//! - [`ServiceActor`]: The request loop that owns a backend.
//! - [`ServiceClient`]: The cloneable handle used to send requests.
//! - [`Response`]: The one-shot reply channel carried inside every request.

use super::error::UpstreamError;
use std::fmt::Debug;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Type alias for the one-shot response channel used by services.
pub type Response<T> = oneshot::Sender<Result<T, UpstreamError>>;

/// State owned by a [`ServiceActor`].
///
/// # Architecture Note
/// The backend never sees a lock. The actor task owns it exclusively and feeds it
/// one request at a time, so `handle` takes `&mut self` and may mutate freely.
/// Each request variant carries its own [`Response`] sender; the backend answers
/// it before returning.
pub trait Backend: Send + 'static {
    /// The closed set of requests this backend understands.
    type Request: Send + Debug + 'static;

    /// Short name used in log lines (e.g. `"orchestrator"`).
    const NAME: &'static str;

    /// Process a single request and answer on its response channel.
    fn handle(&mut self, request: Self::Request);

    /// Number of records held, reported when the loop starts and stops.
    fn size(&self) -> usize {
        0
    }
}

/// The generic actor that owns a [`Backend`].
///
/// **Concurrency Model**:
/// Requests are processed *sequentially* in [`ServiceActor::run`]. Many clients may
/// send concurrently; ordering between them is whatever order the channel delivers.
pub struct ServiceActor<B: Backend> {
    receiver: mpsc::Receiver<B::Request>,
    backend: B,
}

impl<B: Backend> ServiceActor<B> {
    pub fn new(buffer_size: usize, backend: B) -> (Self, ServiceClient<B>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, backend };
        (actor, ServiceClient::new(sender))
    }

    /// Runs the request loop until every client has been dropped.
    pub async fn run(mut self) {
        let service = B::NAME;
        info!(service, size = self.backend.size(), "Service started");

        while let Some(request) = self.receiver.recv().await {
            debug!(service, ?request, "Request");
            self.backend.handle(request);
        }

        info!(service, size = self.backend.size(), "Shutdown");
    }
}

/// A type-safe client for sending requests to a [`ServiceActor`].
///
/// Holds only a sender, so cloning is inexpensive and clones can be shared
/// across tasks.
pub struct ServiceClient<B: Backend> {
    sender: mpsc::Sender<B::Request>,
}

impl<B: Backend> Clone for ServiceClient<B> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<B: Backend> ServiceClient<B> {
    pub fn new(sender: mpsc::Sender<B::Request>) -> Self {
        Self { sender }
    }

    /// Sends a request built around a fresh response channel and awaits the reply.
    ///
    /// ```ignore
    /// let actor = client
    ///     .call(|respond_to| OrchestratorRequest::GetActor { env, id, respond_to })
    ///     .await?;
    /// ```
    pub async fn call<T>(
        &self,
        make_request: impl FnOnce(Response<T>) -> B::Request,
    ) -> Result<T, UpstreamError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make_request(respond_to))
            .await
            .map_err(|_| UpstreamError::Closed)?;
        response.await.map_err(|_| UpstreamError::Dropped)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum CounterRequest {
        Add {
            amount: u64,
            respond_to: Response<u64>,
        },
        Fail {
            respond_to: Response<()>,
        },
    }

    #[derive(Default)]
    struct Counter {
        total: u64,
    }

    impl Backend for Counter {
        type Request = CounterRequest;
        const NAME: &'static str = "counter";

        fn handle(&mut self, request: CounterRequest) {
            match request {
                CounterRequest::Add { amount, respond_to } => {
                    self.total += amount;
                    let _ = respond_to.send(Ok(self.total));
                }
                CounterRequest::Fail { respond_to } => {
                    let _ = respond_to.send(Err(UpstreamError::Rejected("nope".into())));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_requests_are_applied_in_order() {
        let (actor, client) = ServiceActor::new(4, Counter::default());
        let handle = tokio::spawn(actor.run());

        let first = client
            .call(|respond_to| CounterRequest::Add { amount: 2, respond_to })
            .await
            .unwrap();
        let second = client
            .call(|respond_to| CounterRequest::Add { amount: 3, respond_to })
            .await
            .unwrap();
        assert_eq!((first, second), (2, 5));

        let err = client
            .call(|respond_to| CounterRequest::Fail { respond_to })
            .await
            .unwrap_err();
        assert_eq!(err, UpstreamError::Rejected("nope".into()));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_service_reports_closed() {
        let (actor, client) = ServiceActor::new(4, Counter::default());
        drop(actor);

        let err = client
            .call(|respond_to| CounterRequest::Add { amount: 1, respond_to })
            .await
            .unwrap_err();
        assert_eq!(err, UpstreamError::Closed);
    }
}
