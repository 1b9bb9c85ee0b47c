//! WebSocket inbound adapter for the driver location stream.
//!
//! Responsibilities:
//! - upgrade `GET /ws` and hand the connection to its own session task
//! - keep framing, heartbeats, and acks at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{Instrument, error, info_span};

use crate::domain::TraceId;

mod session;

pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// Each connection runs on its own task. The session inherits the request's
/// trace id so side effects of every frame log under it.
#[utoipa::path(
    get,
    path = "/ws",
    tags = ["locations"],
    responses(
        (status = 101, description = "Switched to the location stream"),
        (status = 400, description = "Not a WebSocket upgrade request")
    )
)]
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|err| {
        error!(error = %err, "WebSocket upgrade failed");
        err
    })?;

    let peer = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_owned)
        .unwrap_or_default();
    let ingestion = state.ingestion.clone();
    let span = info_span!("location_stream", %peer);
    let trace_id = TraceId::current_or_generate();
    actix_web::rt::spawn(
        TraceId::scope(
            trace_id,
            session::handle_ws_session(ingestion, session, messages),
        )
        .instrument(span),
    );

    Ok(response)
}
