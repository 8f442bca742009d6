mod agent;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("provider=debug,reqwest=info")
        .init();

    agent::run().await
}
