use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use gatehouse_auth::{AuthService, VerifiedSession};
use gatehouse_core::{ErrorCode, ErrorPayload};
use gatehouse_db::{DbManager, DbRepository, run_migrations};

mod config;
mod migrate;
mod register;
mod session;

use config::ConfigArgs;

#[derive(Debug, Parser)]
#[command(name = "gatehouse", about = "Gatehouse identity and session CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Register an organization and its first user
    Register(register::RegisterArgs),
    /// Start a session with an email and password
    SignIn(session::SignInArgs),
    /// Show the identity behind a session token
    Whoami(session::TokenArgs),
    /// End a session
    SignOut(session::TokenArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Migrate => migrate::run(&self.config).await,
            Commands::Register(args) => register::run(&self.config, args).await,
            Commands::SignIn(args) => session::sign_in(&self.config, args).await,
            Commands::Whoami(args) => session::whoami(&self.config, args).await,
            Commands::SignOut(args) => session::sign_out(&self.config, args).await,
        }
    }
}

async fn connect(config: &ConfigArgs) -> anyhow::Result<DbManager> {
    let db = DbManager::connect(&config.db_config())
        .await
        .context("failed to connect to database")?;
    run_migrations(db.client())
        .await
        .context("failed to apply migrations")?;
    Ok(db)
}

async fn open_service(config: &ConfigArgs) -> anyhow::Result<AuthService<DbRepository>> {
    let db = connect(config).await?;
    AuthService::new(db.repository(), config.auth_config())
        .context("failed to initialize auth service")
}

/// Print the wire payload for a failed action and turn it into an error.
fn fail(code: ErrorCode) -> anyhow::Error {
    println!("error: {}", ErrorPayload::new(code).to_json());
    anyhow::anyhow!("{code}: {}", code.user_message())
}

fn print_session(verified: &VerifiedSession) {
    println!("user_id: {}", verified.user.id);
    println!("email: {}", verified.user.email);
    println!("tenant_id: {}", verified.tenant.id);
    println!("tenant_slug: {}", verified.tenant.slug);
    println!("expires_at: {}", verified.session.expires_at.to_rfc3339());
}

fn require_session(verified: Option<VerifiedSession>) -> anyhow::Result<VerifiedSession> {
    match verified {
        Some(verified) => Ok(verified),
        None => bail!("unauthorized"),
    }
}
