use anyhow::Context;
use confetti::{
    admin::authority::{Authority, TokenAuthority},
    blobs::Blobs,
    config::Config,
    logging,
    store::Store,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(config.log_format);

    let store = Store::connect(&config.database_url)
        .await
        .with_context(|| format!("could not open {}", config.database_url))?;
    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .with_context(|| format!("could not create {}", config.storage_dir.display()))?;

    let app_state = AppState {
        store,
        blobs: Blobs::new(config.storage_dir.clone(), &config.public_base_url),
        authority: Authority::new(TokenAuthority::new(config.admin_token.clone())?),
    };

    let app = confetti::app(app_state, &config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "confetti listening");
    axum::serve(listener, app).await?;
    Ok(())
}
