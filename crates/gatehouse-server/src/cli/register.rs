use clap::Args;
use gatehouse_auth::{MemoryCookieJar, RegisterTenant};

use super::{ConfigArgs, fail, open_service, print_session, require_session};

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    /// Organization display name; its slug must be unused
    #[arg(long)]
    organization: String,

    /// Display name of the first user
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(config: &ConfigArgs, args: RegisterArgs) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let mut jar = MemoryCookieJar::new();

    service
        .sign_up(
            &mut jar,
            RegisterTenant {
                organization_name: args.organization,
                name: args.name,
                email: args.email,
                password: args.password,
            },
        )
        .await
        .map_err(fail)?;

    let verified = require_session(service.current_session(&mut jar).await.map_err(fail)?)?;
    print_session(&verified);
    println!("session_token: {}", verified.session.token);

    Ok(())
}
