use clap::Args;
use gatehouse_auth::AuthConfig;
use gatehouse_db::DbConfig;

/// Connection and auth settings shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct ConfigArgs {
    /// SurrealDB endpoint, e.g. `ws://127.0.0.1:8000` or `mem://`
    #[arg(long, env = "GATEHOUSE_DB_URL", default_value = "mem://", global = true)]
    db_url: String,

    #[arg(long, env = "GATEHOUSE_DB_NAMESPACE", default_value = "gatehouse", global = true)]
    db_namespace: String,

    #[arg(long, env = "GATEHOUSE_DB_DATABASE", default_value = "main", global = true)]
    db_database: String,

    /// Root user; sign-in is skipped unless both user and password are set
    #[arg(long, env = "GATEHOUSE_DB_USER", global = true)]
    db_user: Option<String>,

    #[arg(long, env = "GATEHOUSE_DB_PASSWORD", hide_env_values = true, global = true)]
    db_password: Option<String>,

    /// Secret prepended to passwords before hashing
    #[arg(long, env = "GATEHOUSE_PEPPER", hide_env_values = true, global = true)]
    pepper: Option<String>,

    /// Session lifetime in days
    #[arg(
        long,
        env = "GATEHOUSE_SESSION_DAYS",
        default_value_t = 7,
        value_parser = clap::value_parser!(i64).range(1..),
        global = true
    )]
    session_days: i64,

    /// Deployment environment; `production` marks cookies `Secure`
    #[arg(long = "env", env = "GATEHOUSE_ENV", default_value = "development", global = true)]
    environment: String,
}

impl ConfigArgs {
    pub(crate) fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub(crate) fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            session_duration_days: self.session_days,
            pepper: self.pepper.clone(),
            secure_cookies: self.is_production(),
            ..AuthConfig::default()
        }
    }

    fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
