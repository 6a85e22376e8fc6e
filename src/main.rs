use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use labtracker::api;
use labtracker::config::AppConfig;
use labtracker::db;
use labtracker::mailer::{DisabledMailer, MailTransport, SmtpMailer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::open_database(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "Database ready");

    let mailer: Arc<dyn MailTransport> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP transport configured");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set; report delivery is disabled");
            Arc::new(DisabledMailer)
        }
    };

    let app = api::api_router(conn, mailer);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
