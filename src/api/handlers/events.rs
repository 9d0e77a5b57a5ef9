//! Server-Sent Events stream of catalog changes.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_stream::{Stream, StreamExt};

use crate::domain::events::PublicationEvent;
use crate::state::AppState;

enum Signal {
    Event(Result<PublicationEvent, BroadcastStreamRecvError>),
    Shutdown,
}

/// Streams [`PublicationEvent`]s to the browser.
///
/// # Endpoint
///
/// `GET /api/events`
///
/// Each event is sent with the event name `publication` and a JSON payload:
///
/// ```text
/// event: publication
/// data: {"type":"created","id":"...","title":"...","revision":3}
/// ```
///
/// A subscriber that falls behind the channel capacity receives a single
/// `resync` event instead of the dropped ones and should re-fetch its view.
/// The stream ends when the server begins shutting down.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = BroadcastStream::new(state.publication_service.subscribe()).map(Signal::Event);
    let shutdown = WatchStream::new(state.shutdown.clone())
        .filter(|stopping| *stopping)
        .map(|_| Signal::Shutdown);

    let stream = events
        .merge(shutdown)
        .take_while(|signal| !matches!(signal, Signal::Shutdown))
        .filter_map(|signal| match signal {
            Signal::Event(Ok(event)) => serde_json::to_string(&event)
                .ok()
                .map(|data| Ok(Event::default().event("publication").data(data))),
            Signal::Event(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                tracing::warn!(skipped, "Event subscriber lagged");
                Some(Ok(Event::default()
                    .event("resync")
                    .data(skipped.to_string())))
            }
            Signal::Shutdown => None,
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
