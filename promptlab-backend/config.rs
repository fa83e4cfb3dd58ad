use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Some(Self::Development),
            "testing" | "test" => Some(Self::Testing),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Hierarchical, human-readable output via `tracing-tree`.
    Tree,
    Json,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub environment: Environment,
    pub log_level: String,
    pub log_format: LogFormat,
    pub sentry_dsn: Option<String>,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

const DEFAULT_PORT: u16 = 8000;

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a Config from a key lookup (as environment variables would be).
    /// Used directly in tests to avoid mutating process-global environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = non_empty("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = non_empty("PROMPTLAB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let environment = non_empty("ENVIRONMENT")
            .and_then(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);

        let log_level = non_empty("LOG_LEVEL")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| "info".to_string());

        let log_format = match non_empty("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Tree,
        };

        let sentry_dsn = non_empty("SENTRY_DSN");

        let cors_origins = non_empty("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.iter().any(|o| o == "*"))
            .unwrap_or_default();

        Config {
            host,
            port,
            data_dir,
            environment,
            log_level,
            log_format,
            sentry_dsn,
            cors_origins,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".promptlab")
}
