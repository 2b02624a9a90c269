use crate::state::TweedState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SseEvent {
    CrudStudent,
}

impl SseEvent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CrudStudent => "crud_student",
        }
    }
}

pub async fn sse_feed(
    State(state): State<TweedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe_to_sse_feed()).map(|received| {
        //if we lagged, something still changed
        let event = received.unwrap_or(SseEvent::CrudStudent);
        Ok(Event::default().event(event.name()).data(event.name()))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
