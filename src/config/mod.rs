// Configuration module entry point
// Loads configuration and holds the immutable application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Values given on the command line; they win over file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<u16>,
    pub base_path: Option<String>,
}

impl Config {
    /// Load configuration from the specified file path (extension optional).
    ///
    /// Layering, lowest priority first: defaults, the file (if present),
    /// `SERVER_`-prefixed environment variables, then `overrides`.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.base_path", "/videos")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("server.base_path", overrides.base_path.clone())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file", &Overrides::default()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.base_path, "/videos");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.keep_alive);
        assert_eq!(cfg.performance.header_read_timeout, 30);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            port: Some(9191),
            base_path: Some("/srv/media".to_string()),
        };
        let cfg = Config::load_from("definitely-missing-config-file", &overrides).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.server.base_path, "/srv/media");
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 9191);
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = std::env::temp_dir().join(format!("range-stream-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("server.toml");
        std::fs::write(
            &file,
            "[server]\nport = 7000\nbase_path = \"/data\"\n\n[logging]\naccess_log_format = \"json\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(file.to_str().unwrap(), &Overrides::default()).unwrap();
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.server.base_path, "/data");
        assert_eq!(cfg.logging.access_log_format, "json");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_host() {
        let mut cfg = Config::load_from("definitely-missing-config-file", &Overrides::default()).unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_state_rejects_missing_base() {
        let mut cfg = Config::load_from("definitely-missing-config-file", &Overrides::default()).unwrap();
        cfg.server.base_path = "/definitely/not/a/real/dir".to_string();
        assert!(AppState::new(cfg).is_err());
    }
}
