//! Scripted academy session against the in-memory API.
//!
//! Run with: `cargo run --bin academy`
//!
//! Set `ACADEMY_METRICS=true` to print Prometheus metrics at the end.

use academy::api::InMemoryApi;
use academy::forms::{ChangePasswordForm, ProfilePictureUpload, ProfileSummary};
use academy::types::ContactMessage;
use academy::{AcademyConfig, AppAction, AppContext, fixtures};
use request_state_core::environment::SystemClock;
use request_state_runtime::metrics::MetricsRecorder;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AcademyConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut metrics = MetricsRecorder::new();
    if config.metrics {
        metrics.install()?;
    }

    info!(?config, "Configuration loaded");

    let api = InMemoryApi::new(fixtures::learner(), "secret").with_latency(config.api_latency());
    let mut ctx = AppContext::new(&config, Arc::new(api), Arc::new(SystemClock));

    ctx.run(AppAction::LoadUser, CALL_TIMEOUT).await?;
    if let Some(user) = &ctx.state().user.message {
        info!(summary = ?ProfileSummary::from(user), "Signed in");
    }

    let wrong_password = ChangePasswordForm {
        old_password: "guess".to_string(),
        new_password: "hunter2".to_string(),
    };
    ctx.run(wrong_password.submit()?, CALL_TIMEOUT).await?;

    let picture = ProfilePictureUpload {
        file: vec![0x89, 0x50, 0x4e, 0x47],
    };
    ctx.run(picture.submit()?, CALL_TIMEOUT).await?;

    ctx.run(
        AppAction::SubmitContact(ContactMessage {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            message: "When does the async course start?".to_string(),
        }),
        CALL_TIMEOUT,
    )
    .await?;

    ctx.run(AppAction::CancelSubscription, CALL_TIMEOUT).await?;
    ctx.run(AppAction::CancelSubscription, CALL_TIMEOUT).await?;

    // Let the notification center catch up with the last outcomes.
    while let Some(toast) = ctx.next_toast(Duration::from_millis(200)).await {
        println!("[{:?}] {}: {}", toast.kind, toast.domain.name(), toast.text);
    }

    println!("{}", serde_json::to_string_pretty(&ctx.state())?);

    if let Some(rendered) = metrics.render() {
        println!("{rendered}");
    }

    ctx.shutdown().await?;
    info!("Session closed");
    Ok(())
}
