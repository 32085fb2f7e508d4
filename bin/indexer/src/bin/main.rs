use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use client::AlchemyClient;
use config::NetworkType;
use futures::{
    future::{BoxFuture, LocalBoxFuture, OptionFuture},
    FutureExt,
};
use indexer::{
    app::App,
    config::{Config, MetadataKind},
    metrics, view,
};
use std::{path::PathBuf, sync::Arc};
use token::{
    fetch_result_set, BalanceSource, ContractMetadata, MetadataSource, QueryError, ResultSet,
};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use wallet::{
    RpcWallet, SessionChange, SessionManager, Subscription, WalletError, WalletEvent,
    WalletProvider,
};

#[derive(Debug, Parser)]
#[command(name = "token-indexer", about = "Browse the ERC-20 balances of an address")]
struct Cli {
    /// Optional TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Alchemy API key
    #[arg(long, env = "ALCHEMY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Network to query (mainnet or sepolia)
    #[arg(long, env = "NETWORK")]
    network: Option<NetworkType>,

    /// JSON-RPC wallet endpoint
    #[arg(long, env = "WALLET_RPC_URL")]
    wallet_rpc_url: Option<String>,

    /// Node RPC endpoint, required for contract metadata
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Metadata source (alchemy or contract)
    #[arg(long)]
    metadata_source: Option<MetadataKind>,

    /// Tokens shown per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the balances of an address and exit
    Balances {
        address: String,
        /// Print every page instead of the first one
        #[arg(long)]
        all: bool,
    },
}

impl Cli {
    /// File configuration with command line values layered on top.
    fn resolve(&self) -> eyre::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config: {}", path.display());
                Config::from_file(path)?
            }
            None => Config::default(),
        };

        if let Some(key) = &self.api_key {
            config.alchemy_api_key = Some(key.clone());
        }
        if let Some(network) = self.network {
            config.network = Some(network);
        }
        if let Some(url) = &self.wallet_rpc_url {
            config.wallet_rpc_url = Some(url.clone());
        }
        if let Some(url) = &self.rpc_url {
            config.rpc_url = Some(url.clone());
        }
        if let Some(kind) = self.metadata_source {
            config.metadata_source = kind;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = Some(page_size);
        }
        if let Some(port) = self.metrics_port {
            config.metrics_port = Some(port);
        }

        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    info!("Starting token indexer");

    let config = cli.resolve()?;
    let network = config.network_config();

    info!("Loaded config:");
    info!("  Network: {}", network.network_type);
    info!("  Page size: {}", network.page_size);
    info!("  Metadata source: {}", config.metadata_source);

    if let Some(port) = config.metrics_port {
        metrics::install_prometheus_exporter(port)?;
        info!("Metrics exporter listening on port {}", port);
    }

    let balances = Arc::new(AlchemyClient::new(network.alchemy_url(config.api_key()?)));

    let wallet: Option<Arc<dyn WalletProvider>> = match &config.wallet_rpc_url {
        Some(url) => {
            let provider = client::create_provider(url).await?;
            RpcWallet::detect(provider, network.wallet_poll_interval)
                .await
                .map(|wallet| Arc::new(wallet) as Arc<dyn WalletProvider>)
        }
        None => {
            info!("No wallet endpoint configured");
            None
        }
    };
    let app = App::new(SessionManager::new(wallet), network.page_size);

    match config.metadata_source {
        MetadataKind::Alchemy => {
            let metadata = balances.clone();
            run(app, balances, metadata, cli.command).await
        }
        MetadataKind::Contract => {
            let url = config
                .rpc_url
                .as_deref()
                .ok_or_else(|| eyre::eyre!("Contract metadata requires RPC_URL or rpc_url"))?;
            let provider = client::create_provider(url).await?;
            let metadata = Arc::new(ContractMetadata::new(provider));
            run(app, balances, metadata, cli.command).await
        }
    }
}

async fn run<B, M>(
    mut app: App,
    balances: Arc<B>,
    metadata: Arc<M>,
    command: Option<Command>,
) -> eyre::Result<()>
where
    B: BalanceSource + 'static,
    M: MetadataSource + 'static,
{
    match command {
        Some(Command::Balances { address, all }) => {
            app.set_address_text(address);
            app.run_query(balances.as_ref(), metadata.as_ref()).await?;
            while all && app.load_more() {}
            print!("{}", view::render(&app));
            Ok(())
        }
        None => interactive(app, balances, metadata).await,
    }
}

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Connect,
    Disconnect,
    Address(String),
    Query,
    More,
    Show,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let input = match word {
            "" => return None,
            "connect" | "c" => Self::Connect,
            "disconnect" => Self::Disconnect,
            "address" | "a" => Self::Address(rest.trim().to_string()),
            "query" | "q" => Self::Query,
            "more" | "m" => Self::More,
            "show" | "s" => Self::Show,
            "help" | "h" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            // A bare address is shorthand for `address <text>`
            other if other.starts_with("0x") => Self::Address(other.to_string()),
            other => Self::Unknown(other.to_string()),
        };
        Some(input)
    }
}

const HELP: &str = "\
commands:
  connect            connect the wallet
  disconnect         forget the connected account
  address <0x...>    set the address to query
  query              fetch the balances of the address
  more               show the next page
  show               redraw
  quit               exit";

/// Next wallet event; pending forever without a subscription.
async fn next_event(subscription: &mut Option<Subscription>) -> Option<WalletEvent> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

async fn interactive<B, M>(mut app: App, balances: Arc<B>, metadata: Arc<M>) -> eyre::Result<()>
where
    B: BalanceSource + 'static,
    M: MetadataSource + 'static,
{
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut subscription = app.wallet().subscribe();
    let mut pending_query: Option<LocalBoxFuture<'static, Result<ResultSet, QueryError>>> = None;
    let mut pending_connect: Option<BoxFuture<'static, Result<Vec<Address>, WalletError>>> = None;

    println!("{HELP}\n");
    print!("{}", view::render(&app));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(input) = Input::parse(&line) else { continue };

                match input {
                    Input::Connect => match app.begin_connect() {
                        Ok(_) if pending_connect.is_some() => {
                            println!("A connection request is already pending");
                        }
                        Ok(provider) => {
                            pending_connect =
                                Some(async move { provider.request_accounts().await }.boxed());
                        }
                        Err(e) => println!("{e}"),
                    },
                    Input::Disconnect => app.disconnect(),
                    Input::Address(text) => {
                        app.set_address_text(text);
                    }
                    Input::Query => match app.begin_query() {
                        Ok(owner) => {
                            let balances = balances.clone();
                            let metadata = metadata.clone();
                            pending_query = Some(
                                async move {
                                    fetch_result_set(balances.as_ref(), metadata.as_ref(), owner)
                                        .await
                                }
                                .boxed_local(),
                            );
                        }
                        Err(e) => println!("{e}"),
                    },
                    Input::More => {
                        if !app.load_more() {
                            println!("Nothing more to load");
                        }
                    }
                    Input::Show => {}
                    Input::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    Input::Quit => break,
                    Input::Unknown(word) => {
                        println!("Unknown command: {word} (try `help`)");
                        continue;
                    }
                }
            }

            Some(outcome) = OptionFuture::from(pending_query.as_mut()), if pending_query.is_some() => {
                pending_query = None;
                // Failure is logged and kept in the app's error slot.
                let _ = app.finish_query(outcome);
            }

            Some(outcome) = OptionFuture::from(pending_connect.as_mut()), if pending_connect.is_some() => {
                pending_connect = None;
                let _ = app.finish_connect(outcome);
            }

            event = next_event(&mut subscription) => {
                let Some(event) = event else {
                    warn!("Wallet event stream ended");
                    subscription = None;
                    continue;
                };

                if app.handle_wallet_event(event) == SessionChange::Reload {
                    pending_query = None;
                    pending_connect = None;
                    subscription = app.wallet().subscribe();
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c");
                break;
            }
        }

        print!("{}", view::render(&app));
    }

    info!("Shutting down");
    Ok(())
}
