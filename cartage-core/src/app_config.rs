use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub quote_service: QuoteServiceConfig,
    pub document_service: DocumentServiceConfig,
    #[serde(default)]
    pub fulfillment: FulfillmentRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuoteServiceConfig {
    pub base_url: String,
    /// Per-call deadline, enforced by the HTTP adapter.
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Knobs the engine itself consumes.
#[derive(Debug, Deserialize, Clone)]
pub struct FulfillmentRules {
    /// Collect-on-delivery flag passed through to every courier quote request.
    #[serde(default = "default_cod")]
    pub cod: bool,
}

fn default_cod() -> bool {
    true
}

impl Default for FulfillmentRules {
    fn default() -> Self {
        Self { cod: default_cod() }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        tracing::debug!("Loading configuration for run mode {}", run_mode);

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CARTAGE__FULFILLMENT__COD=false`
            .add_source(config::Environment::with_prefix("CARTAGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
