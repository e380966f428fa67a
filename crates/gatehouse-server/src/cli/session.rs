use anyhow::bail;
use clap::Args;
use gatehouse_auth::{MemoryCookieJar, SignOutOutcome};

use super::{ConfigArgs, fail, open_service, print_session, require_session};

#[derive(Debug, Args)]
pub(crate) struct SignInArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct TokenArgs {
    /// Session token as issued by `sign-in` or `register`
    #[arg(long, env = "GATEHOUSE_SESSION_TOKEN", hide_env_values = true)]
    token: String,
}

pub(crate) async fn sign_in(config: &ConfigArgs, args: SignInArgs) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let mut jar = MemoryCookieJar::new();

    service
        .sign_in(&mut jar, &args.email, &args.password)
        .await
        .map_err(fail)?;

    let verified = require_session(service.current_session(&mut jar).await.map_err(fail)?)?;
    print_session(&verified);
    println!("session_token: {}", verified.session.token);

    Ok(())
}

pub(crate) async fn whoami(config: &ConfigArgs, args: TokenArgs) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let mut jar = MemoryCookieJar::with_session(&args.token);

    let verified = require_session(service.current_session(&mut jar).await.map_err(fail)?)?;
    print_session(&verified);
    println!("renewed: {}", verified.renewed);

    Ok(())
}

pub(crate) async fn sign_out(config: &ConfigArgs, args: TokenArgs) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let mut jar = MemoryCookieJar::with_session(&args.token);

    match service.sign_out(&mut jar).await {
        SignOutOutcome::Success => {
            println!("status: signed-out");
            Ok(())
        }
        SignOutOutcome::Unauthorized => bail!("unauthorized"),
    }
}
