mod schema;

pub use schema::{
    Config, GenerationConfig, MediaConfig, ProviderConfig, SecretsConfig, StorageConfig,
};
