//! nftexp-api — HTTP surface of the nftables exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Landing page |
//! | GET | `/metrics` | Prometheus exposition of the live ruleset |
//! | * | anything else, including `HEAD` | 404, empty body |

pub mod handlers;

use axum::Router;
use axum::routing::{MethodRouter, get};
use nftexp_ruleset::RulesetLoader;

/// Shared state for handlers. Holds only read-only query configuration.
#[derive(Clone, Debug)]
pub struct ExporterState {
    pub loader: RulesetLoader,
}

/// Build the exporter router.
pub fn build_router(loader: RulesetLoader) -> Router {
    let state = ExporterState { loader };

    Router::new()
        .route("/", get_only(get(handlers::landing_page)))
        .route("/metrics", get_only(get(handlers::prometheus_metrics)))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Restrict a `get` route to GET: axum answers HEAD with the GET handler
/// unless a HEAD handler is registered.
fn get_only(route: MethodRouter<ExporterState>) -> MethodRouter<ExporterState> {
    route.head(handlers::not_found).fallback(handlers::not_found)
}
