use crate::signaling::{RelayError, RelayService};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt, future, stream};
use std::convert::Infallible;
use tandem_core::{
    ConnectedAck, CreateRoomResponse, JoinRoomResponse, RoleQuery, SignalEnvelope,
};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info};

pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/events", get(room_events))
        .route("/rooms/{code}/signal", post(post_signal))
        .route("/rooms/{code}/leave", post(leave_room))
        .with_state(service)
}

async fn create_room(State(service): State<RelayService>) -> Json<CreateRoomResponse> {
    let room = service.rooms.create_room();
    Json(CreateRoomResponse { room })
}

async fn join_room(
    State(service): State<RelayService>,
    Path(code): Path<String>,
) -> Result<Json<JoinRoomResponse>, RelayError> {
    let room = service.resolve(&code)?;
    service.rooms.join(&room).await?;
    info!("Guest joined room {}", room);
    Ok(Json(JoinRoomResponse { room }))
}

async fn room_events(
    State(service): State<RelayService>,
    Path(code): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, RelayError> {
    let room = service.resolve(&code)?;
    let rx = service.rooms.subscribe(&room, query.role).await?;
    debug!("{} subscribed to room {}", query.role, room);

    let ack = serde_json::to_string(&ConnectedAck { role: query.role })
        .unwrap_or_else(|_| "{}".to_owned());
    let connected = stream::once(future::ready(Ok::<_, Infallible>(
        Event::default().event("connected").data(ack),
    )));

    let envelopes = UnboundedReceiverStream::new(rx)
        .filter_map(|envelope| future::ready(envelope_event(&envelope).map(Ok::<_, Infallible>)));

    Ok(Sse::new(connected.chain(envelopes)).keep_alive(KeepAlive::default()))
}

async fn post_signal(
    State(service): State<RelayService>,
    Path(code): Path<String>,
    Query(query): Query<RoleQuery>,
    Json(envelope): Json<SignalEnvelope>,
) -> Result<StatusCode, RelayError> {
    let room = service.resolve(&code)?;
    service.rooms.signal(&room, query.role, envelope).await?;
    Ok(StatusCode::OK)
}

/// Leaving is idempotent; unknown rooms are answered with success too.
async fn leave_room(
    State(service): State<RelayService>,
    Path(code): Path<String>,
    Query(query): Query<RoleQuery>,
) -> StatusCode {
    if let Ok(room) = service.resolve(&code) {
        service.rooms.leave(&room, query.role).await;
    }
    StatusCode::OK
}

fn envelope_event(envelope: &SignalEnvelope) -> Option<Event> {
    match Event::default().json_data(envelope) {
        Ok(event) => Some(event),
        Err(e) => {
            error!("Failed to encode {} envelope: {}", envelope.kind(), e);
            None
        }
    }
}
