use bi_agent_dashboard::{
    api::{start_server, ApiState},
    config::DashboardConfig,
    gemini::{CompletionClient, GeminiClient},
    kpi::KpiStore,
    orchestrator::LeadOrchestrator,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DashboardConfig::from_env()?;

    info!("AI Business Intelligence Dashboard");
    info!(port = config.port, data_dir = %config.data_dir.display(), "Configuration loaded");

    let kpis = Arc::new(KpiStore::load(&config.data_dir));

    let client: Option<Arc<dyn CompletionClient>> = match GeminiClient::from_config(&config.llm)? {
        Some(client) => {
            info!(model = %client.model(), "Gemini client ready");
            let client: Arc<dyn CompletionClient> = Arc::new(client);
            Some(client)
        }
        None => {
            warn!("GOOGLE_API_KEY not set; AI features are disabled");
            warn!("See .env.example for setup instructions");
            None
        }
    };

    let orchestrator = LeadOrchestrator::new(kpis, client);
    let port = config.port;

    info!("Orchestrator initialized, starting server...");

    start_server(ApiState::new(config, orchestrator), port).await?;

    Ok(())
}
