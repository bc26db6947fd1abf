use clap::Args;

use crate::infra::mongo::{MongoSettings, DEFAULT_MONGO_DB, DEFAULT_MONGO_URI};

#[derive(Args, Clone, Debug)]
pub struct MongoArgs {
    #[arg(long, env = "MONGO_URI", default_value = DEFAULT_MONGO_URI, help = "MongoDB connection URI")]
    pub uri: String,
    #[arg(long = "db", env = "MONGO_DB", default_value = DEFAULT_MONGO_DB, help = "MongoDB database name")]
    pub db_name: String,
}

impl MongoArgs {
    pub fn settings(&self) -> MongoSettings {
        MongoSettings {
            uri: self.uri.clone(),
            database: self.db_name.clone(),
        }
    }
}
