use anyhow::Result;
use clap::Args;
use colored::*;
use mongodb::bson::{doc, Bson};

use super::mongo_args::MongoArgs;
use crate::infra::mongo::MongoStore;
use crate::infra::store::DocumentStore;
use crate::models::collection_names;

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[arg(long, default_value = "demo-v72", help = "Service whose documents are counted")]
    pub service_name: String,

    #[command(flatten)]
    pub mongo: MongoArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionStatus {
    Counted {
        service_docs: u64,
        total_docs: u64,
        sample_id: Option<String>,
    },
    Failed(String),
}

async fn inspect(store: &dyn DocumentStore, collection: &str, service: &str) -> Result<CollectionStatus> {
    let service_docs = store
        .count_documents(collection, doc! { "service_name": service })
        .await?;
    let total_docs = store.count_documents(collection, doc! {}).await?;

    let sample_id = if service_docs > 0 {
        store
            .find_one(collection, doc! { "service_name": service })
            .await?
            .map(|d| match d.get("_id") {
                Some(Bson::String(id)) => id.clone(),
                Some(id) => id.to_string(),
                None => "N/A".to_string(),
            })
    } else {
        None
    };

    Ok(CollectionStatus::Counted {
        service_docs,
        total_docs,
        sample_id,
    })
}

/// Status of every expected collection. One collection failing does not
/// stop the others from being inspected.
pub async fn audit(store: &dyn DocumentStore, service: &str) -> Vec<(&'static str, CollectionStatus)> {
    let mut results = Vec::new();
    for collection in collection_names() {
        let status = inspect(store, collection, service)
            .await
            .unwrap_or_else(|e| CollectionStatus::Failed(format!("{:#}", e)));
        results.push((collection, status));
    }
    results
}

pub async fn run(args: CheckArgs) -> Result<()> {
    let store = MongoStore::connect(&args.mongo.settings()).await?;
    let all_collections = store.list_collection_names().await?;

    println!("{}", "=== Database Collections Status ===".bold().blue());
    println!("Database: {}", store.name());
    println!("Total collections: {}\n", all_collections.len());

    let mut total = 0;
    for (collection, status) in audit(&store, &args.service_name).await {
        match status {
            CollectionStatus::Counted {
                service_docs,
                total_docs,
                sample_id,
            } => {
                println!("{} {}:", "✔".green(), collection);
                println!("   - {} documents: {}", args.service_name, service_docs);
                println!("   - total documents: {}", total_docs);
                if let Some(id) = sample_id {
                    println!("   - sample _id: {}", id);
                }
                total += service_docs;
            }
            CollectionStatus::Failed(err) => {
                println!("{} {}: {}", "✘".red(), collection, err);
            }
        }
        println!();
    }

    println!(
        "{}",
        format!("Total {} documents across all collections: {}", args.service_name, total).bold()
    );
    println!("\nAll collections in database: {:?}", all_collections);
    Ok(())
}
