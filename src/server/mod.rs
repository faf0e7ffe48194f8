//! The HTTP API: routes, handlers and the mapping of errors to JSON responses.

mod error;
mod handlers;

use crate::config::CorsPolicy;
use crate::Ledger;
use axum::extract::{MatchedPath, Request};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn};

pub(crate) use error::ApiError;

/// The paths served by the API.
pub mod endpoints {
    pub const ROOT: &str = "/";
    pub const TEST_GOOGLE_SHEETS: &str = "/test_google_sheets";
    pub const ADD_ENTRY: &str = "/add_entry";
    pub const GET_ENTRIES: &str = "/get_entries";
    pub const GET_DROPDOWN_OPTIONS: &str = "/get_dropdown_options";
}

/// Return a router with all the app's routes. Handlers share `ledger` through axum state.
pub fn build_router(ledger: Ledger, cors: &CorsPolicy) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(handlers::read_root))
        .route(
            endpoints::TEST_GOOGLE_SHEETS,
            get(handlers::test_google_sheets),
        )
        .route(endpoints::ADD_ENTRY, post(handlers::add_entry))
        .route(endpoints::GET_ENTRIES, get(handlers::get_entries))
        .route(
            endpoints::GET_DROPDOWN_OPTIONS,
            get(handlers::get_dropdown_options),
        )
        .fallback(handlers::not_found)
        .with_state(ledger)
        .layer(cors_layer(cors))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                let matched_path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);
                info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    matched_path,
                )
            }),
        )
}

fn cors_layer(cors: &CorsPolicy) -> CorsLayer {
    match cors {
        CorsPolicy::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsPolicy::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring the invalid CORS origin '{origin}'");
                        None
                    }
                })
                .collect();
            // Wildcards cannot be combined with credentials, so methods and headers are mirrored.
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}
