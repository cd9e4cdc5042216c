//! Wiring for a full discovery run: receiver, HTTP clients, explorer.

use anyhow::{Context, Result};
use tracing::{info, warn};
use webhook::server::{serve, spawn};
use webhook::state::ReceiverState;
use webhook::store::NotificationStore;

use crate::explore::{ExploreConfig, Explorer, RunSummary};
use crate::io::analysis::ChatAnalyzer;
use crate::io::calls::{CallEndpoints, HttpCallClient};
use crate::io::config::{ApiSettings, DiscoveryConfig};
use crate::io::openai::OpenAiClient;
use crate::io::transcription::WhisperTranscriber;

/// Run discovery over `seeds` against the real call system.
///
/// The notification receiver lives exactly as long as the run: it is bound
/// before the first call and shut down after the results are written.
pub async fn run_session(
    config: &DiscoveryConfig,
    api: &ApiSettings,
    seeds: &[String],
) -> Result<RunSummary> {
    config.validate()?;
    api.validate()?;

    let store = NotificationStore::new();
    let receiver_state =
        ReceiverState::new(store.clone()).with_secret(api.webhook_secret.clone());
    let receiver = spawn(config.webhook_addr()?, receiver_state).await?;
    info!(
        addr = %receiver.local_addr(),
        webhook_url = %api.webhook_url,
        "receiving call notifications"
    );

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("build HTTP client")?;
    let calls = HttpCallClient::new(
        http.clone(),
        CallEndpoints::from(api),
        store,
        config.poll_interval(),
        config.recordings_dir.clone(),
    );
    let openai = OpenAiClient::new(http, api.openai_api_key.clone(), &config.openai.base_url);
    let transcriber = WhisperTranscriber::new(openai.clone(), &config.openai.transcription_model);
    let analyzer = ChatAnalyzer::new(openai, &config.openai.analysis_model);

    let mut explorer = Explorer::new(
        &calls,
        &transcriber,
        &analyzer,
        ExploreConfig {
            recording_timeout: config.recording_timeout(),
            limits: config.limits(),
            results_path: config.results_path(),
        },
    );
    let outcome = explorer.run_discovery(seeds).await;

    if let Err(err) = receiver.shutdown().await {
        warn!(error = %format!("{err:#}"), "notification receiver did not stop cleanly");
    }
    outcome
}

/// Serve only the notification receiver until Ctrl-C.
pub async fn serve_receiver(
    config: &DiscoveryConfig,
    webhook_secret: Option<String>,
) -> Result<()> {
    let state = ReceiverState::new(NotificationStore::new()).with_secret(webhook_secret);
    serve(config.webhook_addr()?, state, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
        }
    })
    .await
}
