use storefront_server::core::{Config, Server, ServerState};
use storefront_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    logger::init_logger_with_file(config.log_level.as_deref(), config.log_dir.as_deref());
    tracing::info!(
        port = config.http_port,
        work_dir = %config.work_dir.display(),
        "starting storefront server"
    );

    let state = ServerState::initialize(config).await?;
    Server::new(state).run().await
}
