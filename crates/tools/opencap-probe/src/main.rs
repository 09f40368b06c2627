//! OpenCAP probe
//!
//! Command-line harness for exercising a directory by alias:
//! - SRV discovery of the directory host
//! - Authentication
//! - Address reads, writes and deletes

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use opencap_client::{AuthOutcome, ClientConfig, DirectoryClient, DnsConfig, DnsProvider};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "opencap-probe")]
#[command(about = "OpenCAP directory probe", long_about = None)]
struct Cli {
    /// DNS provider used for SRV discovery
    #[arg(long, value_enum, default_value = "system")]
    dns: DnsChoice,

    /// Explicit nameserver (repeatable); overrides --dns
    #[arg(long = "nameserver")]
    nameservers: Vec<SocketAddr>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DnsChoice {
    System,
    Cloudflare,
    Google,
    Quad9,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the directory host of an alias
    Resolve {
        /// Alias, e.g. user@example.com
        alias: String,
    },

    /// Authenticate and print the token payload
    Auth {
        /// Alias, e.g. user@example.com
        alias: String,

        /// Password
        #[arg(long, env = "OPENCAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Fetch one address
    Get {
        /// Alias, e.g. user@example.com
        alias: String,

        /// Address type (e.g. 100 for Bitcoin)
        address_type: u32,
    },

    /// Fetch all addresses
    GetAll {
        /// Alias, e.g. user@example.com
        alias: String,
    },

    /// Add or replace an address
    Put {
        /// Alias, e.g. user@example.com
        alias: String,

        /// Address type (e.g. 100 for Bitcoin)
        address_type: u32,

        /// Address value
        address: String,

        /// Token from `auth`
        #[arg(long, env = "OPENCAP_JWT", hide_env_values = true)]
        jwt: String,
    },

    /// Delete one address
    Delete {
        /// Alias, e.g. user@example.com
        alias: String,

        /// Address type (e.g. 100 for Bitcoin)
        address_type: u32,

        /// Token from `auth`
        #[arg(long, env = "OPENCAP_JWT", hide_env_values = true)]
        jwt: String,
    },

    /// Delete all addresses
    DeleteAll {
        /// Alias, e.g. user@example.com
        alias: String,

        /// Token from `auth`
        #[arg(long, env = "OPENCAP_JWT", hide_env_values = true)]
        jwt: String,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let provider = if !self.nameservers.is_empty() {
            DnsProvider::Custom(self.nameservers.clone())
        } else {
            match self.dns {
                DnsChoice::System => DnsProvider::System,
                DnsChoice::Cloudflare => DnsProvider::Cloudflare,
                DnsChoice::Google => DnsProvider::Google,
                DnsChoice::Quad9 => DnsProvider::Quad9,
            }
        };

        let config = ClientConfig::default().with_dns(DnsConfig::new(provider));
        match self.timeout {
            Some(secs) => config.with_request_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.client_config();
    info!("DNS provider: {}", config.dns.provider.name());

    let client = DirectoryClient::from_config(&config).context("building OpenCAP client")?;

    let output = match cli.command {
        Commands::Resolve { alias } => {
            let target = client.resolve(&alias).await?;
            info!("{} is served by {}", alias, target);
            Value::String(target.base_url())
        }
        Commands::Auth { alias, password } => {
            match client.authenticate(&alias, &password).await? {
                AuthOutcome::Authenticated(result) => serde_json::to_value(result)?,
                AuthOutcome::Rejected(body) => bail!("authentication rejected: {}", body),
            }
        }
        Commands::Get {
            alias,
            address_type,
        } => client.get_address(&alias, address_type).await?,
        Commands::GetAll { alias } => client.get_addresses(&alias).await?,
        Commands::Put {
            alias,
            address_type,
            address,
            jwt,
        } => client.put_address(&alias, address_type, &address, &jwt).await?,
        Commands::Delete {
            alias,
            address_type,
            jwt,
        } => client.delete_address(&alias, address_type, &jwt).await?,
        Commands::DeleteAll { alias, jwt } => client.delete_all_addresses(&alias, &jwt).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
