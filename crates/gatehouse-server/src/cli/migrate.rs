use super::{ConfigArgs, connect};

pub(crate) async fn run(config: &ConfigArgs) -> anyhow::Result<()> {
    let db_config = config.db_config();
    connect(config).await?;

    println!("namespace: {}", db_config.namespace);
    println!("database: {}", db_config.database);
    println!("status: up-to-date");

    Ok(())
}
