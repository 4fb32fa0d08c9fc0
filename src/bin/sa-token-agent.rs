use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sa_token_agent::config::types::ServiceConfig;
use sa_token_agent::credentials::record::CredentialRecord;
use sa_token_agent::exchange::transport::HttpTransport;
use sa_token_agent::helpers::time::SystemClock;
use sa_token_agent::jwt::signer::Rs256Signer;
use sa_token_agent::server;
use sa_token_agent::utils::config_loader;
use sa_token_agent::utils::logging;
use sa_token_agent::utils::logging::LogLevel;
use sa_token_agent::TokenProvider;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "sa-token-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an access token for the configured scopes
    AccessToken,
    /// Print an ID token for the configured target audience
    IdToken {
        /// Also write the token (with its creation time) to this file
        #[arg(long)]
        save: Option<String>,
    },
    /// Serve tokens (and metrics) over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build provider from the credential document
    // -------------------------------

    let provider = build_provider(&service_config).await?;

    // -------------------------------
    // 3. Run the requested command
    // -------------------------------

    match args.command {
        Command::AccessToken => {
            let token = provider.get_access_token().await?;
            println!("{}", token.access_token);
        }
        Command::IdToken { save } => {
            let token = provider.get_id_token().await?;
            if let Some(path) = save {
                token
                    .save(&path)
                    .await
                    .with_context(|| format!("cannot save id token to '{}'", path))?;
                info!("id token saved to '{}'", path);
            }
            println!("{}", token.id_token);
        }
        Command::Serve => {
            info!("Service starting...");
            server::server::start(&service_config.settings, Arc::new(provider)).await?;
        }
    }

    Ok(())
}

async fn build_provider(service_config: &ServiceConfig) -> Result<TokenProvider> {
    let provider_config = &service_config.provider;
    let transport = match service_config.settings.http_timeout_ms {
        Some(ms) => HttpTransport::with_timeout(Duration::from_millis(ms))?,
        None => HttpTransport::default(),
    };
    let credentials = CredentialRecord::load(&provider_config.credentials_path, &Rs256Signer)
        .await
        .context("cannot load service account credentials")?;

    Ok(TokenProvider::from_record(
        credentials,
        provider_config.options.clone(),
        transport,
        Rs256Signer,
        SystemClock,
    ))
}
