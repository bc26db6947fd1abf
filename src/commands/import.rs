use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use super::mongo_args::MongoArgs;
use crate::flows::import::import_service;
use crate::infra::memory::MemoryStore;
use crate::infra::mongo::MongoStore;
use crate::infra::store::DocumentStore;

#[derive(Args, Clone, Debug)]
pub struct ImportArgs {
    #[arg(help = "Service name (e.g. demo-v73)")]
    pub service_name: String,

    #[arg(long, env = "JSON_OUTPUT_ROOT", default_value = "json", help = "Root folder containing <service>/*.json")]
    pub root: PathBuf,

    #[command(flatten)]
    pub mongo: MongoArgs,

    #[arg(long, help = "Run against an in-memory store instead of MongoDB")]
    pub dry_run: bool,
}

pub async fn run(args: ImportArgs) -> Result<()> {
    let service = args.service_name.trim();

    let store: Box<dyn DocumentStore> = if args.dry_run {
        println!("{}", "Dry run: nothing will be written to MongoDB".yellow());
        Box::new(MemoryStore::new())
    } else {
        Box::new(MongoStore::connect(&args.mongo.settings()).await?)
    };

    let report = import_service(store.as_ref(), &args.root, service).await?;
    for (file, collection, count) in &report.collections {
        println!("Imported {} docs into {} from {}", count, collection, file);
    }
    println!("{} Total inserted: {}", "Done.".green().bold(), report.total());
    Ok(())
}
