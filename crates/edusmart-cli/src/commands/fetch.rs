use anyhow::{Result, bail};
use edusmart_application::AppServices;
use serde_json::Value;
use std::time::Duration;

/// Issues one scoped read and prints the JSON body.
pub async fn run(services: &AppServices, endpoint: &str) -> Result<()> {
    let snapshot = services.resolver.settled().await?;
    if snapshot.scope().is_none() {
        bail!("No active campus and academic year; nothing to scope {} by", endpoint);
    }

    let fetcher = services.fetcher();
    let handle = fetcher.fetch::<Value>(endpoint);
    let mut states = handle.subscribe();

    let wait = services.config.request_timeout() + Duration::from_secs(1);
    let state = tokio::time::timeout(
        wait,
        states.wait_for(|s| !s.loading && (s.data.is_some() || s.error.is_some())),
    )
    .await
    .map_err(|_| anyhow::anyhow!("Timed out waiting for {}", endpoint))??
    .clone();

    if let Some(error) = state.error {
        if error.is_unauthenticated() {
            services.sessions.invalidate().await;
        }
        return Err(error.into());
    }
    if let Some(data) = state.data {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}
