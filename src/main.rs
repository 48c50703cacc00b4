use anyhow::{Context, Result};
use green_marine_wizard::{
    AppState, LogSink, SubmissionSink, WebhookSink, WizardConfig, WizardManifest, create_router,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "green_marine_wizard=info,tower_http=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WizardConfig::from_env().context("Invalid configuration")?;

    let manifest = match &config.manifest_path {
        Some(path) => WizardManifest::load(path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?,
        None => WizardManifest::embedded().context("Embedded manifest is invalid")?,
    };
    tracing::info!(
        name = %manifest.name,
        steps = manifest.step_count(),
        motors = manifest.motors.motors().len(),
        "Manifest loaded"
    );

    let sink: Arc<dyn SubmissionSink> = match &config.webhook_url {
        Some(url) => {
            let webhook = WebhookSink::new(url.clone()).context("Failed to set up webhook sink")?;
            Arc::new(webhook)
        }
        None => Arc::new(LogSink),
    };
    tracing::info!(
        sink = sink.name(),
        "Submissions go to {}",
        config.webhook_url.as_deref().unwrap_or("the log")
    );

    let state = AppState::new(Arc::new(manifest), sink, config.auto_advance)
        .with_session_limits(config.session_idle, config.max_sessions);
    let app = create_router(state, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!("Wizard listening on http://{}", config.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
