pub async fn ready(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<crate::AppState>>,
) -> Result<&'static str, crate::error::Error> {
    let start = std::time::Instant::now();

    let result = match state
        .shutdown
        .run_until_cancelled(state.resolver.ready(time::OffsetDateTime::now_utc()))
        .await
    {
        Ok(Ok(())) => Ok("OK"),
        Ok(Err(crate::resolve::Error::Stale(delay))) => Err(crate::error::Error::Status(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            format!("still {delay} behind"),
        )),
        Ok(Err(err)) => Err(err.into()),
        Err(cancelled) => Err(cancelled.into()),
    };
    super::observe("ready", start, &result);
    result
}
