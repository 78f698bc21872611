mod dashboard;
mod generate;
mod mode;
mod problem;
mod router;
mod telemetry;

use std::net::SocketAddr;

use chrono::Utc;
use placement_storage::Database;
use placement_util::{load_env_file, AppConfig};
use tracing::info;

use crate::mode::Mode;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;
    let mode = Mode::from_args(std::env::args().skip(1))?;

    telemetry::init_tracing(&config)?;

    let database = Database::connect(&config.database_url).await?;
    database.run_migrations().await?;

    match mode {
        Mode::Generate { record_count } => {
            let mut settings = config.generator;
            if let Some(record_count) = record_count {
                settings.record_count = record_count;
            }

            let report = generate::run(&database, settings, Utc::now().date_naive()).await?;
            println!("Successfully inserted {} student records.", report.inserted);
            Ok(())
        }
        Mode::Serve => {
            let metrics = telemetry::init_metrics()?;
            let state = router::AppState::new(metrics, database);

            let addr: SocketAddr = config.bind_addr;
            info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router::app_router(state))
                .await
                .map_err(|err| err.into())
        }
    }
}
