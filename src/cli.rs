//! Command-line interface.
//!
//! Parses arguments with clap, resolves the layered configuration, and
//! applies serve-time overrides on top of it. The global flags feed the
//! [`ConfigLoader`] explicitly instead of round-tripping through
//! environment variables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

/// Custom validation functions for CLI arguments
mod validation {
    use crate::config::Environment;

    /// Validate port number is within valid range (1-65535)
    pub fn parse_port(value: &str) -> Result<u16, String> {
        let port: u16 = value
            .parse()
            .map_err(|_| format!("Port must be a valid number between 1 and 65535, got: '{value}'"))?;

        if port == 0 {
            return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
        }

        Ok(port)
    }

    /// Parse an environment name (development, test, staging, production)
    pub fn parse_environment(value: &str) -> Result<Environment, String> {
        value.parse().map_err(|e: crate::config::error::ConfigError| e.to_string())
    }
}

/// User account management service
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(about = "User account management service")]
#[command(version = crate::clap_long_version())]
#[command(long_about = "
Warden serves a user account management API with JWT authentication,
role-based authorization and avatar storage.

EXAMPLES:
    # Start the server with the layered configuration
    warden serve

    # Start on a custom host and port
    warden serve --host 0.0.0.0 --port 8080

    # Load configuration from another directory, as production
    warden --config-dir /etc/warden --environment production serve

    # Validate the configuration without binding a socket
    warden serve --dry-run
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and the environment overlays
    #[arg(long, value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Environment to run as (development, test, staging, production)
    #[arg(
        short,
        long,
        value_name = "ENV",
        global = true,
        value_parser = validation::parse_environment
    )]
    pub environment: Option<Environment>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind, overriding the configured server.host
        #[arg(long, value_name = "ADDRESS")]
        host: Option<String>,

        /// Port to listen on, overriding the configured server.port
        #[arg(long, value_name = "PORT", value_parser = validation::parse_port)]
        port: Option<u16>,

        /// Validate the configuration and exit without starting the server
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    /// Loads the layered configuration honoring the global flags, then
    /// applies the serve-time overrides on top.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration cannot be loaded or the
    /// merged result fails validation.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let mut loader = match &self.config_dir {
            Some(dir) => ConfigLoader::with_config_dir(dir),
            None => ConfigLoader::new()?,
        };

        if let Some(environment) = self.environment {
            loader = loader.with_environment(environment);
        }

        let mut settings = loader.load()?;

        if let Some(Commands::Serve { host, port, .. }) = &self.command {
            if let Some(host) = host {
                settings.server.host = host.clone();
            }
            if let Some(port) = port {
                settings.server.port = *port;
            }
            // Overrides bypass the load-time check, so re-validate.
            settings.server.validate()?;
        }

        Ok(settings)
    }

    /// True when `serve --dry-run` was requested.
    pub fn is_dry_run(&self) -> bool {
        matches!(
            self.command,
            Some(Commands::Serve { dry_run: true, .. })
        )
    }
}

/// Validates everything the server would check at startup and prints a
/// summary, without binding a socket or touching the database.
pub fn dry_run_report(settings: &Settings) -> Result<(), ConfigError> {
    settings.validate()?;
    settings.jwt.validate()?;

    println!("✓ Configuration is valid");
    println!("✓ Server would bind to {}", settings.server.address());
    println!(
        "✓ Database pool: {}..{} connections",
        settings.database.min_connections, settings.database.max_connections
    );
    println!("✓ Upload directory: {}", settings.storage.upload_dir);
    println!(
        "✓ Token lifetimes: access {}h, refresh {}h",
        settings.jwt.access_token_expiration, settings.jwt.refresh_token_expiration
    );
    println!("Dry run complete. The configuration is ready to serve.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BASE_CONFIG: &str = r#"
[application]
name = "warden"
version = "1.0.0"

[server]
host = "127.0.0.1"
port = 3000
request_timeout = 30
keep_alive_timeout = 75

[database]
url = "postgres://localhost/warden_cli_test"
max_connections = 10
min_connections = 1
connection_timeout = 30

[jwt]
secret = "0123456789abcdef0123456789abcdef"
access_token_expiration = 1
refresh_token_expiration = 168

[logger]
level = "info"

[logger.console]
enabled = true
colored = true

[logger.file]
enabled = false

[storage]
upload_dir = "uploads"
max_upload_size = 5242880
"#;

    fn config_dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(dir.path().join(name), content).expect("Failed to write config file");
        }
        dir
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from(["warden", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .expect("Should parse");

        match cli.command {
            Some(Commands::Serve { host, port, dry_run }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(!dry_run);
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_port_zero() {
        let result = Cli::try_parse_from(["warden", "serve", "--port", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_environment() {
        let result = Cli::try_parse_from(["warden", "--environment", "galaxy", "serve"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_environment_aliases() {
        let cli = Cli::try_parse_from(["warden", "--environment", "prod", "serve"])
            .expect("Should parse");
        assert_eq!(cli.environment, Some(Environment::Production));
    }

    #[test]
    fn test_is_dry_run() {
        let dry = Cli::try_parse_from(["warden", "serve", "--dry-run"]).expect("Should parse");
        assert!(dry.is_dry_run());

        let wet = Cli::try_parse_from(["warden", "serve"]).expect("Should parse");
        assert!(!wet.is_dry_run());
    }

    #[test]
    fn test_load_settings_applies_overrides() {
        let dir = config_dir_with(&[("default.toml", BASE_CONFIG)]);
        let dir_arg = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "warden",
            "--config-dir",
            dir_arg,
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9090",
        ])
        .expect("Should parse");

        let settings = cli.load_settings().expect("Should load settings");
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9090);
        // Untouched values still come from the files
        assert_eq!(settings.database.url, "postgres://localhost/warden_cli_test");
    }

    #[test]
    fn test_load_settings_picks_environment_overlay() {
        let staging = r#"
[server]
port = 8443
"#;
        let dir = config_dir_with(&[("default.toml", BASE_CONFIG), ("staging.toml", staging)]);
        let dir_arg = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "warden",
            "--config-dir",
            dir_arg,
            "--environment",
            "staging",
            "serve",
        ])
        .expect("Should parse");

        let settings = cli.load_settings().expect("Should load settings");
        assert_eq!(settings.server.port, 8443);
    }

    #[test]
    fn test_dry_run_report_rejects_weak_jwt_secret() {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/warden".to_string();
        settings.jwt.secret = "short".to_string();

        assert!(dry_run_report(&settings).is_err());
    }
}
