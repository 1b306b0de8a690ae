use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockwise_observability::init();

    let config = stockwise_api::ApiConfig::from_env();
    let app = stockwise_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
