use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    Mock,
    Empty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub seed: SeedMode,
    /// JSON snapshot loaded at start-up. Takes precedence over `seed`.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
    pub top_performers_limit: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("seed", "mock")?
            .set_default("top_performers_limit", crate::calc::DEFAULT_TOP_PERFORMERS as u64)?
            .add_source(File::with_name("edutrack").required(false))
            // e.g. EDUTRACK__SEED=empty, EDUTRACK__SEED_FILE=/path/snapshot.json
            .add_source(
                Environment::with_prefix("EDUTRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
