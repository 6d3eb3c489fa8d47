// src/server/sse.rs

//! Server-Sent Events endpoint pushing reload notifications.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use super::AppState;

/// GET /__livereload
pub async fn sse_handler(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("live-reload client connected");

    let stream = BroadcastStream::new(app.live.subscribe()).filter_map(|msg| {
        // Lagged receivers just miss intermediate events; the next one
        // reloads the page anyway.
        let event = msg.ok()?;
        let json = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event("reload").data(json)))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
