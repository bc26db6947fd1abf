use anyhow::Result;
use clap::{Args, ValueEnum};
use mongodb::bson::{self, doc};
use std::time::Duration;

use super::mongo_args::MongoArgs;
use crate::api::client::{ApiClient, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use crate::infra::mongo::MongoStore;
use crate::infra::store::DocumentStore;
use crate::logic::parsing::{nest_dotted, parse_value, validate_field_path};
use crate::models::SERVICES;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchVia {
    /// PUT the change through the configuration API
    Api,
    /// Write the change straight into MongoDB
    Db,
}

#[derive(Args, Clone, Debug)]
pub struct PatchArgs {
    #[arg(long, default_value = "demo-v90")]
    pub service_name: String,

    #[arg(long, default_value = "argocd_application.path", help = "Dotted path of the field to set")]
    pub field: String,

    #[arg(long, default_value = ".")]
    pub value: String,

    #[arg(long, help = "Parse --value as a JSON literal instead of a string")]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = PatchVia::Api)]
    pub via: PatchVia,

    #[arg(long, env = "API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, env = "API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub mongo: MongoArgs,
}

pub async fn run(args: PatchArgs) -> Result<()> {
    validate_field_path(&args.field)?;
    let value = parse_value(&args.value, args.json)?;

    match args.via {
        PatchVia::Api => {
            let client = ApiClient::new(&args.api_base, Duration::from_secs(args.timeout_secs))?;
            let body = nest_dotted(&args.field, value);
            let (status, text) = client.update_service(&args.service_name, &body).await?;
            println!("Status Code: {}", status.as_u16());
            println!("Response: {}", text);
        }
        PatchVia::Db => {
            let store = MongoStore::connect(&args.mongo.settings()).await?;
            let modified = patch_document(&store, &args.service_name, &args.field, value).await?;
            println!("Updated {} document(s)", modified);
            println!("{} {} set in {}", args.service_name, args.field, store.name());
        }
    }
    Ok(())
}

/// `$set` `field` on the `services` document named `service`.
pub async fn patch_document(
    store: &dyn DocumentStore,
    service: &str,
    field: &str,
    value: serde_json::Value,
) -> Result<u64> {
    validate_field_path(field)?;
    let value = bson::to_bson(&value)?;
    store
        .set_field(SERVICES, doc! { "name": service }, field, value)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryStore;
    use crate::infra::mongo::{DEFAULT_MONGO_DB, DEFAULT_MONGO_URI};

    fn api_args(field: &str) -> PatchArgs {
        PatchArgs {
            service_name: "demo-v90".to_string(),
            field: field.to_string(),
            value: "1".to_string(),
            json: true,
            via: PatchVia::Api,
            // Nothing listens here; a request that gets sent fails as transport.
            api_base: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            mongo: MongoArgs {
                uri: DEFAULT_MONGO_URI.to_string(),
                db_name: DEFAULT_MONGO_DB.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_api_patch_rejects_malformed_field_before_sending() {
        for bad in ["a..b", "", "a."] {
            let err = run(api_args(bad)).await.unwrap_err();
            assert!(err.to_string().contains("Invalid field path"), "{:?}: {:#}", bad, err);
        }
    }

    #[tokio::test]
    async fn test_patch_document_sets_dotted_field() {
        let store = MemoryStore::new();
        store
            .insert_many(SERVICES, vec![doc! { "_id": "demo-v90", "name": "demo-v90" }])
            .await
            .unwrap();

        let modified = patch_document(&store, "demo-v90", "argocd_application.path", serde_json::json!("."))
            .await
            .unwrap();
        assert_eq!(modified, 1);

        let found = store.find_one(SERVICES, doc! { "name": "demo-v90" }).await.unwrap().unwrap();
        assert_eq!(
            found.get_document("argocd_application").unwrap().get_str("path").unwrap(),
            "."
        );
    }

    #[tokio::test]
    async fn test_patch_document_rejects_empty_segments() {
        let store = MemoryStore::new();
        assert!(patch_document(&store, "x", "a..b", serde_json::json!(1)).await.is_err());
        assert!(patch_document(&store, "x", "", serde_json::json!(1)).await.is_err());
    }
}
