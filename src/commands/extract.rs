use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

use crate::flows::extract::{discover_services, extract_service, now_timestamp};

#[derive(Args, Clone, Debug)]
pub struct ExtractArgs {
    #[arg(env = "SERVICE_NAME", default_value = DEFAULT_SERVICE, help = "Service name")]
    pub service_name: String,

    #[arg(long, env = "MANIFEST_SOURCE_ROOT", default_value = ".", help = "Folder containing services/<name>/k8s")]
    pub source_root: PathBuf,

    #[arg(long, env = "JSON_OUTPUT_ROOT", default_value = "json", help = "Folder receiving <name>/*.json")]
    pub output_root: PathBuf,

    #[arg(long, help = "Extract every service found under the source root")]
    pub all: bool,
}

pub const DEFAULT_SERVICE: &str = "demo-v73";

impl ExtractArgs {
    fn services(&self) -> Vec<String> {
        if self.all {
            return discover_services(&self.source_root);
        }
        vec![self.service_name.trim().to_string()]
    }
}

pub async fn run(args: ExtractArgs) -> Result<()> {
    let services = args.services();
    if services.is_empty() {
        return Err(anyhow!(
            "No services with a k8s folder under {:?}",
            args.source_root.join("services")
        ));
    }

    let created = now_timestamp();
    for service in services {
        let report = extract_service(&service, &args.source_root, &args.output_root, &created)?;
        println!(
            "Generated JSON collections for {} at {}",
            report.service,
            report.output_dir.display()
        );
    }
    Ok(())
}
