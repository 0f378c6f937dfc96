pub async fn info(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<crate::AppState>>,
    axum::extract::Path(actor): axum::extract::Path<String>,
) -> Result<axum::response::Json<crate::info::AccountView>, crate::error::Error> {
    let start = std::time::Instant::now();
    let actor = actor.to_lowercase();

    let result = state
        .shutdown
        .run_until_cancelled(crate::info::lookup(state.store.as_ref(), &actor))
        .await
        .map_err(crate::error::Error::from)
        .and_then(|r| r.map(axum::response::Json).map_err(crate::error::Error::from));
    super::observe("info", start, &result);
    result
}
