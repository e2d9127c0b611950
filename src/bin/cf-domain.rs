// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Foundry Domain Tool
//!
//! Drives the domain reconciliation core against a live Cloud Controller.
//!
//! ```text
//! cf-domain create <spec.json>
//! cf-domain read   <state.json>
//! cf-domain delete <state.json>
//! cf-domain plan   <spec.json> [state.json]
//! cf-domain apply  <spec.json> [state.json]
//! cf-domain import <guid>
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.
//!
//! Run with: cargo run --bin cf-domain --features cf-api -- <command>
//!
//! Prerequisites:
//! 1. CF_API_URL pointing at the Cloud Controller
//! 2. CF_ACCESS_TOKEN holding a valid bearer token (e.g. `cf oauth-token`)
//! 3. Optional CF_ROUTING_API_URL when the routing API lives elsewhere

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cim_cf_domain::adapters::{CloudControllerClient, CloudControllerConfig};
use cim_cf_domain::{
    DomainResource, DomainSpec, Guid, LifecycleManager, ReconcilerConfig, ResourceHooks,
    TrackedState,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

const USAGE: &str = "usage: cf-domain <create|read|delete|plan|apply|import> <args...>";

fn load_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => bail!(USAGE),
    };

    let reconciler = ReconcilerConfig::from_env().context("Invalid reconciler configuration")?;
    let cloud_controller =
        CloudControllerConfig::from_env().context("Cloud Controller configuration incomplete")?;
    info!("🔌 Cloud Controller: {}", cloud_controller.api_url);
    info!(
        "📋 Delete confirmation: {} attempt(s), up to {:?} of waiting",
        reconciler.delete_confirmation.max_attempts,
        reconciler.delete_confirmation.total_budget()
    );

    let client = CloudControllerClient::new(cloud_controller)
        .context("Failed to create Cloud Controller client")?;
    let resource = DomainResource::new(LifecycleManager::from_control_plane(
        Arc::new(client),
        reconciler,
    ));

    match (command, rest) {
        ("create", [spec]) => {
            let spec: DomainSpec = load_json(spec)?;
            print_json(&resource.create(&spec).await?)?;
        }
        ("read", [state]) => {
            let state: TrackedState = load_json(state)?;
            match resource.read(&state).await? {
                Some(refreshed) => print_json(&refreshed)?,
                None => {
                    warn!("⚠️ Domain {} no longer exists", state.id);
                    println!("null");
                }
            }
        }
        ("delete", [state]) => {
            let state: TrackedState = load_json(state)?;
            resource.delete(&state).await?;
            info!("✅ Deleted domain {}", state.id);
        }
        ("plan", [spec, state @ ..]) if state.len() <= 1 => {
            let spec: DomainSpec = load_json(spec)?;
            let state: Option<TrackedState> = state.first().map(|p| load_json(p)).transpose()?;
            print_json(&resource.plan(&spec, state.as_ref()).await?)?;
        }
        ("apply", [spec, state @ ..]) if state.len() <= 1 => {
            let spec: DomainSpec = load_json(spec)?;
            let state: Option<TrackedState> = state.first().map(|p| load_json(p)).transpose()?;
            print_json(&resource.apply(&spec, state.as_ref()).await?)?;
        }
        ("import", [guid]) => {
            print_json(&resource.import(&Guid::new(guid.as_str())).await?)?;
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
