//! Runtime configuration from flags and environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASS: &str = "cambia-esto";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "ADMIN_PASS is unset or still the placeholder; set it, or pass --allow-default-password for local testing"
    )]
    InsecurePassword,
}

/// Check-in registry server.
#[derive(Clone, Debug, Parser)]
#[command(name = "asistencia", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BIND_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, short = 'p', env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Username allowed to read and download the records.
    #[arg(long, env = "ADMIN_USER", default_value = DEFAULT_ADMIN_USER)]
    pub admin_user: String,

    /// Password for the admin user.
    #[arg(long, env = "ADMIN_PASS", default_value = DEFAULT_ADMIN_PASS, hide_default_value = true, hide_env_values = true)]
    pub admin_pass: String,

    /// JSON file holding the records.
    #[arg(long, env = "DATA_FILE", default_value = "registro_estudiantes.json")]
    pub data_file: PathBuf,

    /// Directory with index.html, admin.html and other assets.
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Start even if the admin password is the placeholder.
    #[arg(long, env = "ALLOW_DEFAULT_PASSWORD")]
    pub allow_default_password: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Refuses the placeholder password unless explicitly allowed.
    pub fn check(&self) -> Result<(), ConfigError> {
        let insecure = self.admin_pass.is_empty() || self.admin_pass == DEFAULT_ADMIN_PASS;
        if !insecure {
            return Ok(());
        }
        if !self.allow_default_password {
            return Err(ConfigError::InsecurePassword);
        }
        warn!("admin password is the placeholder; anyone who knows it can download every record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("asistencia").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_and_defaults_combine() {
        let config = parse(&["--admin-pass", "x", "--host", "127.0.0.1", "-p", "8080"]);
        assert_eq!(config.addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.data_file, PathBuf::from("registro_estudiantes.json"));
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn placeholder_password_is_refused_unless_allowed() {
        let config = parse(&["--admin-pass", DEFAULT_ADMIN_PASS]);
        assert!(matches!(config.check(), Err(ConfigError::InsecurePassword)));

        let config = parse(&["--admin-pass", DEFAULT_ADMIN_PASS, "--allow-default-password"]);
        assert!(config.check().is_ok());
    }

    #[test]
    fn real_password_passes() {
        assert!(parse(&["--admin-pass", "una-clave-larga"]).check().is_ok());
    }
}
