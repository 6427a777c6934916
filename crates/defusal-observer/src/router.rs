//! Request routing for the bridge listener.
//!
//! Routing is deliberately loose: a request matches a route when its
//! path *contains* the route keyword anywhere, case-sensitively. The
//! query string never takes part in matching. When a path contains more
//! than one keyword the precedence is `causeStrike`, then
//! `startMission`, then `bombInfo`.
//!
//! [`resolve`] is a pure function so the table can be tested without a
//! server. [`build_router`] wires it into Axum as a single fallback
//! handler, since substring matching has no equivalent in Axum's path
//! routes.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Path keyword for the state read.
pub const BOMB_INFO: &str = "bombInfo";
/// Path keyword for starting a mission.
pub const START_MISSION: &str = "startMission";
/// Path keyword for causing a strike.
pub const CAUSE_STRIKE: &str = "causeStrike";

/// What a request asks the bridge to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Return the latest snapshot.
    GetInfo,
    /// Queue a mission start.
    StartMission {
        /// Mission identifier, empty when absent.
        mission_id: String,
        /// Seed, empty when absent.
        seed: String,
    },
    /// Queue a strike.
    CauseStrike {
        /// Strike reason, empty when absent.
        reason: String,
    },
    /// No keyword matched.
    Unknown,
}

/// Query parameters the routes care about.
///
/// Other keys are ignored. A key given several times keeps its first
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// `missionId`
    pub mission_id: Option<String>,
    /// `seed`
    pub seed: Option<String>,
    /// `reason`
    pub reason: Option<String>,
}

impl QueryParams {
    /// Collect the known keys from decoded `(key, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "missionId" => &mut params.mission_id,
                "seed" => &mut params.seed,
                "reason" => &mut params.reason,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// Map a request path and its parameters to a [`Route`].
pub fn resolve(path: &str, params: QueryParams) -> Route {
    if path.contains(CAUSE_STRIKE) {
        Route::CauseStrike {
            reason: params.reason.unwrap_or_default(),
        }
    } else if path.contains(START_MISSION) {
        Route::StartMission {
            mission_id: params.mission_id.unwrap_or_default(),
            seed: params.seed.unwrap_or_default(),
        }
    } else if path.contains(BOMB_INFO) {
        Route::GetInfo
    } else {
        Route::Unknown
    }
}

/// Build the Axum router for the bridge listener.
///
/// Every method and path lands in [`handlers::dispatch`]. CORS allows
/// any origin, so every response carries
/// `Access-Control-Allow-Origin: *`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(handlers::dispatch)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
