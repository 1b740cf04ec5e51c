use std::convert::Infallible;
use warp::{Filter, Reply};

use crate::handlers_health::build_health_routes;
use crate::handlers_search::build_search_routes;
use crate::handlers_static::build_static_routes;
use crate::warp_helpers::{cors, handle_rejection, AppState};

/// Every route the server exposes, with logging and rejection handling.
pub fn build_routes(state: AppState) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    build_health_routes()
        .or(build_search_routes(state))
        .or(build_static_routes())
        .with(cors())
        .with(warp::log("king_airlines"))
        .recover(handle_rejection)
}
