use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::types::{RepeatChoice, RepeatChoices, default_choices};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub repeat: RepeatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Ceiling on the number of occurrences produced by one expansion.
    pub max_count: usize,
    /// When `false`, zone conversion is a pass-through.
    pub use_tz: bool,
    /// IANA name of the deployment's current time zone.
    pub time_zone: String,
    /// Years past the current year at which open-ended repetition stops.
    pub horizon_years: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_count: 200,
            use_tz: true,
            time_zone: "UTC".to_string(),
            horizon_years: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepeatConfig {
    /// Accept any rule string instead of the configured choices.
    #[serde(default)]
    pub free_text: bool,
    #[serde(default = "default_choices")]
    pub choices: Vec<RepeatChoice>,
}

impl RepeatConfig {
    /// ## Summary
    /// Returns the repeat vocabulary described by this configuration.
    #[must_use]
    pub fn vocabulary(&self) -> RepeatChoices {
        if self.free_text {
            RepeatChoices::free_text()
        } else {
            RepeatChoices::new(self.choices.clone())
        }
    }
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            free_text: false,
            choices: default_choices(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `eventide.toml` file into a `Settings`.
    ///
    /// Environment variables use the `EVENTIDE_` prefix and `__` between
    /// nested keys, e.g. `EVENTIDE_ENGINE__MAX_COUNT=500`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating the result fails.
    pub fn load() -> CoreResult<Self> {
        let settings = Config::builder()
            .set_default("engine.max_count", 200)?
            .set_default("engine.use_tz", true)?
            .set_default("engine.time_zone", "UTC")?
            .set_default("engine.horizon_years", 10)?
            .set_default("repeat.free_text", false)?
            .set_default("logging.level", "info")?
            // Env file
            .add_source(
                config::Environment::with_prefix("EVENTIDE")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("eventide").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks values that deserialize correctly but cannot drive the engine.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` for a zero `max_count`, a
    /// negative horizon, or an empty time zone name.
    pub fn validate(&self) -> CoreResult<()> {
        if self.engine.max_count == 0 {
            return Err(CoreError::InvalidConfiguration(
                "engine.max_count must be at least 1".to_string(),
            ));
        }
        if self.engine.horizon_years < 0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "engine.horizon_years must not be negative, got {}",
                self.engine.horizon_years
            )));
        }
        if self.engine.time_zone.trim().is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "engine.time_zone must name a time zone".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> CoreResult<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        max_count = settings.engine.max_count,
        use_tz = settings.engine.use_tz,
        time_zone = %settings.engine.time_zone,
        "Configuration loaded"
    );
    Ok(settings)
}
