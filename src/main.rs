use tenflow::{
    app::{build_app, serve},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let state = AppState::init()?;
    let log_level = state.config.log_level.clone();

    let sqlx_level = if log_level == "debug" { "debug" } else { "warn" };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "tenflow={},tower_http=info,sqlx={}",
            log_level, sqlx_level
        )
    });
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    if let Err(e) = state.db.migrate().await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let db = state.db.clone();
    serve(build_app(state)).await?;
    db.close().await;

    Ok(())
}
