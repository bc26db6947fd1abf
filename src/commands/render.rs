use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tracing::info;

use crate::api::client::{ApiClient, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use crate::flows::render::{RenderConfig, Renderer};
use crate::logic::defaults::ManifestDefaults;

#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    #[arg(long, env = "API_BASE", default_value = DEFAULT_API_BASE, help = "Base URL of the configuration API")]
    pub api_base: String,

    #[arg(long, env = "SERVICE_NAME", help = "Render only this service (default: every service)")]
    pub service_name: Option<String>,

    #[arg(long, env = "IMAGE_REGISTRY", default_value = "registry.local", help = "Registry used for the default container image")]
    pub image_registry: String,

    #[arg(long, env = "API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, help = "Deadline for every API request")]
    pub timeout_secs: u64,
}

pub async fn run(args: RenderArgs) -> Result<()> {
    let client = ApiClient::new(&args.api_base, Duration::from_secs(args.timeout_secs))?;
    let config = RenderConfig::new(
        args.service_name,
        ManifestDefaults::with_registry(&args.image_registry),
    );

    let renderer = Renderer::new(client, config);
    let mut out = std::io::stdout();
    let summary = renderer.render(&mut out).await?;

    info!(
        "Rendered {} document(s) for {} service(s), skipped {}",
        summary.documents,
        summary.rendered.len(),
        summary.skipped.len()
    );
    Ok(())
}
