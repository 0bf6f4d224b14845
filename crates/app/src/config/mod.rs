use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    cli::Cli,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/fintrack.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the records and settings files.
    pub data_dir: String,
    pub timezone: String,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            timezone: "Africa/Kigali".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Today's date in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))?;
        Ok(Utc::now().with_timezone(&tz).date_naive())
    }
}

/// Layers the config file, `FINTRACK_*` environment variables and CLI flags,
/// in increasing priority.
pub fn load(cli: &Cli) -> Result<AppConfig> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FINTRACK"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = &cli.data_dir {
        settings.data_dir = data_dir.clone();
    }
    if let Some(timezone) = &cli.timezone {
        settings.timezone = timezone.clone();
    }
    if let Some(level) = &cli.level {
        settings.level = level.clone();
    }

    Ok(settings)
}
