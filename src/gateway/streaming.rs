use std::convert::Infallible;

use axum::response::sse::{Event, Sse};
use futures_util::stream::{Stream, StreamExt};
use tracing::error;

use crate::orchestrator::{InferenceEvent, InferenceStream};

/// Serves an [`InferenceStream`] as Server-Sent Events.
///
/// Each event is sent as `event: <kind>` with the JSON-encoded event as data.
/// Dropping the response (client disconnect) drops the stream, which cancels every
/// in-flight inference call.
pub fn into_sse(
    stream: InferenceStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    Sse::new(stream.map(|event| Ok(event_for(&event))))
}

pub fn event_for(event: &InferenceEvent) -> Event {
    match Event::default().event(event.kind()).json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            error!(kind = event.kind(), error = %e, "Failed to serialize inference event");
            Event::default().comment("serialization-error")
        }
    }
}
