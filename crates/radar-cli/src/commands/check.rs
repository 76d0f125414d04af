use anyhow::{Result, bail};
use radar_agents::LlmProvider;
use radar_config::{AppConfig, Requirement};
use radar_gateway::bootstrap::llm_provider;

pub async fn run(config: AppConfig) -> Result<()> {
    config.validate(Requirement::Check)?;
    let provider = llm_provider(&config)?;

    if provider.health_check().await? {
        println!("✅ {} reachable (model {})", provider.provider_id(), config.llm.model);
        Ok(())
    } else {
        bail!("{} is not reachable with the configured key and base URL", provider.provider_id())
    }
}
