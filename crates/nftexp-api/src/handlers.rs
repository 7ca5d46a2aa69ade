//! Route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error};

use crate::ExporterState;

const LANDING_PAGE: &str = "<html>
<head><title>prometheus nftables exporter</title></head>
<body>
<h1>prometheus nftables exporter</h1>
<p>Visit <a href=\"/metrics\"><code>/metrics</code></a> to use.</p>
</body>
</html>
";

/// GET /
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// GET /metrics
///
/// Every call loads its own snapshot. The scrape runs in a separate task
/// so a panic in the pipeline fails only this request.
pub async fn prometheus_metrics(State(state): State<ExporterState>) -> Response {
    let loader = state.loader;
    let task = tokio::spawn(async move { nftexp_metrics::scrape(&loader).await });

    match task.await {
        Ok(Ok(body)) => {
            debug!(bytes = body.len(), "scrape served");
            (
                StatusCode::OK,
                [(CONTENT_TYPE, nftexp_metrics::CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "scrape failed");
            error_response(e.summary())
        }
        Err(e) => {
            error!(error = %e, "scrape task aborted");
            error_response("internal error while generating metrics")
        }
    }
}

/// Fallback for unknown paths and methods.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn error_response(summary: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("error: {summary}\n"),
    )
        .into_response()
}
