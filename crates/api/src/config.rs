use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight jobs to settle (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Root of the scratch areas (`tmp`, `generation`).
    pub storage_root: PathBuf,
    /// Converter configuration file, passed through untouched.
    pub converter_config_path: PathBuf,
    /// Command line used to launch the converter.
    pub converter_command: String,
    /// Optional per-job time limit. `None` means jobs may run forever.
    pub job_timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                           |
    /// |-------------------------|-----------------------------------|
    /// | `HOST`                  | `0.0.0.0`                         |
    /// | `PORT`                  | `5000`                            |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`           |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                              |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                              |
    /// | `STORAGE_ROOT`          | `storage`                         |
    /// | `CONVERTER_CONFIG_PATH` | `storage/config/main_config.yaml` |
    /// | `CONVERTER_COMMAND`     | `text2midi-convert`               |
    /// | `JOB_TIMEOUT_SECS`      | unset                             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let storage_root = PathBuf::from(
            std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".into()),
        );

        let converter_config_path = PathBuf::from(
            std::env::var("CONVERTER_CONFIG_PATH")
                .unwrap_or_else(|_| "storage/config/main_config.yaml".into()),
        );

        let converter_command =
            std::env::var("CONVERTER_COMMAND").unwrap_or_else(|_| "text2midi-convert".into());

        let job_timeout_secs = std::env::var("JOB_TIMEOUT_SECS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .expect("JOB_TIMEOUT_SECS must be a valid u64")
            });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            storage_root,
            converter_config_path,
            converter_command,
            job_timeout_secs,
        }
    }
}
