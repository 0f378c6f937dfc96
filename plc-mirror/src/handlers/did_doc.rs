pub async fn did_doc(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<crate::AppState>>,
    axum::extract::Path(did): axum::extract::Path<String>,
) -> Result<axum::response::Json<plc_directory::Document>, crate::error::Error> {
    let start = std::time::Instant::now();
    let did = did.to_lowercase();

    let result = match state
        .shutdown
        .run_until_cancelled(
            state
                .resolver
                .resolve(&did, time::OffsetDateTime::now_utc()),
        )
        .await
    {
        Ok(Ok(doc)) => Ok(axum::response::Json(doc)),
        Ok(Err(err)) => {
            if matches!(
                err,
                crate::resolve::Error::Tracker(_) | crate::resolve::Error::Store(_)
            ) {
                tracing::error!(did = %did, error = %err, "failed to get the last log entry");
            }
            Err(err.into())
        }
        Err(cancelled) => Err(cancelled.into()),
    };
    super::observe("did_doc", start, &result);
    result
}
