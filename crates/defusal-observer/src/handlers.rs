//! Request handler for the bridge listener.
//!
//! A single handler serves every request. It resolves the route from
//! the path, then either reads the published snapshot or queues one
//! command and echoes the accepted parameters back. The echo only means
//! the command was queued; it has not run yet.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Json;
use defusal_types::Command;
use tracing::debug;

use crate::error::ObserverError;
use crate::router::{QueryParams, Route, resolve};
use crate::state::AppState;

/// Decode the query string of `uri`.
///
/// An absent or undecodable query yields no parameters rather than an
/// error.
pub fn query_params(uri: &Uri) -> QueryParams {
    let pairs = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();
    QueryParams::from_pairs(pairs)
}

/// Fallback handler for every method and path.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ObserverError> {
    let route = resolve(uri.path(), query_params(&uri));

    let response = match route {
        Route::GetInfo => Json(&*state.snapshot()).into_response(),
        Route::StartMission { mission_id, seed } => {
            let body = format!("{mission_id} {seed}");
            enqueue(&state, Command::StartMission { mission_id, seed })?;
            body.into_response()
        }
        Route::CauseStrike { reason } => {
            let body = reason.clone();
            enqueue(&state, Command::CauseStrike { reason })?;
            body.into_response()
        }
        Route::Unknown => ().into_response(),
    };

    Ok(response)
}

/// Queue `command` for the next tick.
fn enqueue(state: &AppState, command: Command) -> Result<(), ObserverError> {
    let kind = command.kind();
    let pending = state.submit(command)?;
    debug!(command = kind, pending, "Command queued");
    Ok(())
}
