mod telemetry;

use std::error::Error;

use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: production passes real environment variables.
    let dotenv = dotenvy::dotenv();

    telemetry::init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => return Err(e.into()),
    }

    if let Err(e) = api::start().await {
        error!(error = %e, "server stopped with error");
        return Err(e.into());
    }

    Ok(())
}
