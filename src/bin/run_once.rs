//! One pipeline pass from the environment, for cron jobs and manual checks.
//! Prints the run report as JSON.

use anyhow::Result;
use borderadar::config::{Catalog, Settings};
use borderadar::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    borderadar::init_tracing();

    let settings = Settings::from_env();
    let catalog = Catalog::load_default()?;
    let pipeline = Pipeline::from_settings(&settings, &catalog)?;

    let report = pipeline.run_once().await;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
