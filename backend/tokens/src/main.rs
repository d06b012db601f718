use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use server::database::RedisStore;
use tokens::{Credential, provision};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Also write the tokens to this Redis instead of only printing them.
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Credentials as `user:password`.
    #[arg(required = true)]
    credentials: Vec<Credential>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    for credential in &args.credentials {
        println!(
            "username: {} base64: {} hash: {}",
            credential.user, credential.token, credential.hash
        );
    }

    if let Some(redis_url) = args.redis_url {
        let store = RedisStore::connect(&redis_url, 1, Duration::from_secs(1))
            .await
            .with_context(|| format!("Failed to connect to {redis_url}"))?;

        provision(&store, &args.credentials)
            .await
            .context("Failed to write tokens")?;

        info!("Provisioned {} token(s)", args.credentials.len());
    }

    Ok(())
}
