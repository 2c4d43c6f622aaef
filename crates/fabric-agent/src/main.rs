//! Fabric agent binary
//!
//! Reads notifications from stdin (or `FABRIC_EVENTS`) and writes
//! configuration intents to stdout as JSON lines. Logs go to stderr.

use fabric_agent::{run, AgentConfig, FabricAgent, JsonLinesSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabric_agent=info,fabric_election=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AgentConfig::try_from_env()?;
    tracing::info!(local = %config.local, rr_count = config.rr_count, "Starting fabric agent");

    let agent = FabricAgent::new(&config)?;
    let mut sink = JsonLinesSink::stdout();
    let report_path = Some(config.report_path.as_path());

    let agent = match &config.events {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            run(agent, file, &mut sink, report_path).await?
        }
        None => run(agent, tokio::io::stdin(), &mut sink, report_path).await?,
    };

    tracing::info!(
        nodes = agent.topology().graph().len(),
        route_reflectors = ?agent.election().route_reflectors(),
        "Fabric agent stopped"
    );
    Ok(())
}
