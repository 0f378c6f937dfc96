mod did_doc;
mod info;
mod ready;

pub use did_doc::did_doc;
pub use info::info;
pub use ready::ready;

pub fn router(state: std::sync::Arc<crate::AppState>) -> axum::Router {
    axum::Router::new()
        .route("/ready", axum::routing::get(ready))
        .route("/info/:actor", axum::routing::get(info))
        .route("/:did", axum::routing::get(did_doc))
        .with_state(state)
}

/// Records request count and latency for a finished request.
fn observe<T>(
    route: &'static str,
    start: std::time::Instant,
    result: &Result<T, crate::error::Error>,
) {
    let status = match result {
        Ok(_) => axum::http::StatusCode::OK,
        Err(err) => err.status_code(),
    };
    let status = status.as_u16().to_string();
    metrics::increment_counter!(
        "plcmirror_requests_total",
        "route" => route,
        "status" => status.clone()
    );
    metrics::histogram!(
        "plcmirror_request_latency_ms",
        start.elapsed().as_secs_f64() * 1000.0,
        "route" => route,
        "status" => status
    );
}
