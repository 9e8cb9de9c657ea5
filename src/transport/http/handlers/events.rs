use crate::app::change_notifier::Signal;
use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt};

pub const UPDATE_EVENT: &str = "inventory_update";

fn to_event(signal: Signal) -> Event {
    match signal {
        Signal::Update => Event::default()
            .event(UPDATE_EVENT)
            .data(r#"{"type":"inventory_update"}"#),
        Signal::KeepAlive => Event::default().comment("keep-alive"),
    }
}

/// Opens a push stream. Every committed mutation yields one `inventory_update` event;
/// the payload carries no item data, so clients re-fetch `/api/inventory`.
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Server-sent event stream", content_type = "text/event-stream", body = String)
    )
)]
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.notifier.subscribe();
    tracing::info!(
        subscriber = ?subscription.id(),
        subscribers = state.notifier.subscriber_count(),
        "push client connected"
    );

    // Leading comment flushes the response head so the client sees the stream open.
    let stream = tokio_stream::once(Event::default().comment("connected"))
        .chain(subscription.map(to_event))
        .map(Ok);
    Sse::new(stream)
}
