mod tables;

pub use tables::{
    CurveTables, EarlyWarningTables, EngineTables, PharmacovigilanceTables, ProspectionTables,
    SignalRanges, SynthesisTables, TherapeuticTables, VitalTables,
};

use std::env;
use std::fs;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Top-level configuration for the scoring binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub tables_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let tables_path = env::var("ENGINE_TABLES_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            tables_path,
        })
    }

    /// Resolve the engine tables, falling back to the calibrated defaults.
    pub fn engine_tables(&self) -> Result<EngineTables, ConfigError> {
        match &self.tables_path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::TablesRead {
                    path: path.clone(),
                    source,
                })?;
                EngineTables::from_json(&raw).map_err(|source| ConfigError::TablesParse {
                    path: path.clone(),
                    source,
                })
            }
            None => Ok(EngineTables::default()),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read engine tables at {path:?}")]
    TablesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("engine tables at {path:?} are not valid JSON")]
    TablesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ENGINE_TABLES_PATH");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.tables_path.is_none());

        let tables = config.engine_tables().expect("default tables");
        assert_eq!(tables, EngineTables::default());
    }

    #[test]
    fn reads_table_overrides_from_file() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        let path = env::temp_dir().join(format!("neuro-tables-{}.json", std::process::id()));
        fs::write(&path, r#"{ "synthesis": { "pattern_publish_threshold": 0.75 } }"#)
            .expect("write overrides");
        env::set_var("ENGINE_TABLES_PATH", &path);
        env::set_var("APP_ENV", "ci");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        let tables = config.engine_tables().expect("tables parse");
        assert_eq!(tables.synthesis.pattern_publish_threshold, 0.75);
        assert_eq!(tables.vital, VitalTables::default());

        fs::remove_file(&path).ok();
        reset_env();
    }

    #[test]
    fn malformed_tables_are_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        let path = env::temp_dir().join(format!("neuro-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").expect("write file");
        env::set_var("ENGINE_TABLES_PATH", &path);

        let config = AppConfig::load().expect("config loads");
        let err = config.engine_tables().expect_err("malformed json rejected");
        assert!(matches!(err, ConfigError::TablesParse { .. }));

        fs::remove_file(&path).ok();
        reset_env();
    }
}
