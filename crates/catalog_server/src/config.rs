//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    /// Coloured output, debug level by default.
    Debug,
    /// Plain output, info level by default.
    Prod,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog_server", about = "Movie catalog REST server")]
pub struct ServerConfig {
    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "LOG", value_enum, default_value = "debug")]
    pub log: LogMode,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub dbhost: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub dbport: u16,

    #[arg(long, env = "POSTGRES_USER", default_value = "user_postgres")]
    pub pguser: String,

    #[arg(long, env = "POSTGRES_PASSWORD", default_value = "pass", hide_env_values = true)]
    pub pgpass: String,

    #[arg(long, env = "POSTGRES_DB", default_value = "test")]
    pub dbname: String,

    /// HMAC secret for signing bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    #[arg(long, env = "DB_CONNECT_ATTEMPTS", default_value_t = 10)]
    pub db_connect_attempts: u32,
}

impl ServerConfig {
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.pguser, self.pgpass, self.dbhost, self.dbport, self.dbname
        )
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn default_log_filter(&self) -> &'static str {
        match self.log {
            LogMode::Debug => "debug,hyper=info,sqlx=warn",
            LogMode::Prod => "info,sqlx=warn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> ServerConfig {
        let mut args = vec!["catalog_server", "--jwt-secret", "s"];
        args.extend_from_slice(extra);
        ServerConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn urls_are_assembled_from_parts() {
        let cfg = parse(&[
            "--host", "0.0.0.0", "--port", "3000", "--dbhost", "db", "--dbport", "5433",
            "--pguser", "catalog", "--pgpass", "pw", "--dbname", "films",
        ]);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.database_url(), "postgres://catalog:pw@db:5433/films");
    }

    #[test]
    fn log_mode_selects_default_filter() {
        assert!(parse(&["--log", "debug"]).default_log_filter().starts_with("debug"));
        assert!(parse(&["--log", "prod"]).default_log_filter().starts_with("info"));
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = parse(&["--port", "8080", "--log", "prod", "--dbname", "films"]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.log, LogMode::Prod);
        assert!(cfg.database_url().ends_with("/films"));
    }
}
