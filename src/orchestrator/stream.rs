use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use super::cancel::CancellationHandle;
use super::events::InferenceEvent;

/// Cancellable stream of [`InferenceEvent`]s for one request.
///
/// Once cancelled (through [`cancel`](Self::cancel), a cloned [`CancellationHandle`],
/// or by dropping the stream) it yields `None` and never another event, `complete`
/// included. Dropping aborts the driver and every in-flight pipeline.
pub struct InferenceStream {
    events: ReceiverStream<InferenceEvent>,
    cancel: CancellationHandle,
    driver: JoinHandle<()>,
    request_id: Uuid,
    finished: bool,
}

impl std::fmt::Debug for InferenceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceStream")
            .field("request_id", &self.request_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("finished", &self.finished)
            .finish()
    }
}

impl InferenceStream {
    pub(crate) fn new(
        events: ReceiverStream<InferenceEvent>,
        cancel: CancellationHandle,
        driver: JoinHandle<()>,
        request_id: Uuid,
    ) -> Self {
        Self {
            events,
            cancel,
            driver,
            request_id,
            finished: false,
        }
    }

    /// Identifier used in this request's log lines.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// A handle that cancels this stream from elsewhere.
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    /// Stops the stream: no further events, in-flight calls aborted.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.driver.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drains the stream into a vector.
    pub async fn collect_events(mut self) -> Vec<InferenceEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}

impl Stream for InferenceStream {
    type Item = InferenceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished || self.cancel.is_cancelled() {
            self.finished = true;
            return Poll::Ready(None);
        }

        match self.events.poll_next_unpin(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for InferenceStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.driver.abort();
    }
}
