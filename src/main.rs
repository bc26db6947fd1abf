use manifestctl::commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Render Kubernetes manifests for services as YAML on stdout")]
    Render(commands::render::RenderArgs),
    #[command(about = "Convert a service's k8s YAML manifests into JSON collection files")]
    Extract(commands::extract::ExtractArgs),
    #[command(about = "Import a service's JSON collection files into MongoDB")]
    Import(commands::import::ImportArgs),
    #[command(about = "Count a service's documents in every collection")]
    Check(commands::check::CheckArgs),
    #[command(about = "Set one field of a service document")]
    Patch(commands::patch::PatchArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries the rendered manifests, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args).await,
        Commands::Extract(args) => commands::extract::run(args).await,
        Commands::Import(args) => commands::import::run(args).await,
        Commands::Check(args) => commands::check::run(args).await,
        Commands::Patch(args) => commands::patch::run(args).await,
    }
}
