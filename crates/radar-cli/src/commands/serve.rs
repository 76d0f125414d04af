use anyhow::Result;
use radar_config::{AppConfig, Requirement};
use radar_gateway::GatewayServer;
use tracing::info;

pub async fn run(config: AppConfig) -> Result<()> {
    config.validate(Requirement::Serve)?;
    info!(
        "starting radar gateway v{} ({:?} mode, model {})",
        env!("CARGO_PKG_VERSION"),
        config.telegram.mode,
        config.llm.model
    );
    GatewayServer::new(config).run().await?;
    Ok(())
}
