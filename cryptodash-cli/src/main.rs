use clap::{Parser, Subcommand};
use cryptodash_core::format::{format_percent, format_summary_row, format_usd, summary_header};
use cryptodash_core::{
    CoinDetail, CryptoListController, CryptoSummary, DashConfig, Dashboard, ListView,
    PendingFetch, SessionStore, global_session,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "cryptodash")]
#[command(about = "A CLI for browsing cryptocurrency market data")]
struct Cli {
    /// API base URL (overrides CRYPTODASH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Bearer token to send with every request
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the top 10 cryptocurrencies
    Top,
    /// Show a single page of the full list
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Rows per page (must be one of the configured sizes)
        #[arg(short, long)]
        size: Option<usize>,
    },
    /// Page through the full list interactively
    Browse {
        /// Rows per page to start with
        #[arg(short, long)]
        size: Option<usize>,
    },
    /// Show details for one coin
    Detail {
        /// Coin id, e.g. "bitcoin"
        coin_id: String,
    },
}

#[derive(Debug, PartialEq)]
enum BrowseCommand {
    Next,
    Prev,
    Goto(usize),
    Size(usize),
    Refresh,
    Quit,
    Help,
}

fn parse_browse_command(input: &str) -> Option<BrowseCommand> {
    let mut parts = input.split_whitespace();
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().and_then(|arg| arg.parse::<usize>().ok());

    match (command.as_str(), argument) {
        ("n" | "next", None) => Some(BrowseCommand::Next),
        ("p" | "prev", None) => Some(BrowseCommand::Prev),
        ("g" | "goto", Some(page)) => Some(BrowseCommand::Goto(page)),
        ("s" | "size", Some(size)) => Some(BrowseCommand::Size(size)),
        ("r" | "refresh", None) => Some(BrowseCommand::Refresh),
        ("q" | "quit", None) => Some(BrowseCommand::Quit),
        ("h" | "help" | "?", None) => Some(BrowseCommand::Help),
        _ => None,
    }
}

fn print_browse_help(sizes: &[usize]) {
    println!("Commands: n(ext), p(rev), g(oto) <page>, s(ize) <rows>, r(efresh), q(uit)");
    println!("Allowed page sizes: {:?}", sizes);
}

fn print_view(view: &ListView<CryptoSummary>) {
    if let Some(failure) = &view.failure {
        eprintln!("Warning: {}", failure);
    }
    if view.items.is_empty() {
        println!("No coins on this page.");
    } else {
        println!("{}", summary_header());
        let offset = view.page_index.saturating_mul(view.page_size);
        for (i, coin) in view.items.iter().enumerate() {
            println!("{}", format_summary_row(offset + i + 1, coin));
        }
    }

    let window = view.window();
    println!(
        "{}  (page {} of {})",
        window.displayed_rows_label(),
        view.page_index + 1,
        view.total_pages.max(1)
    );
}

fn print_detail(coin: &CoinDetail) {
    println!("{} ({})", coin.name, coin.symbol.to_uppercase());
    if !coin.description.en.is_empty() {
        println!();
        println!("{}", coin.description.en.trim());
    }
    println!();
    println!(
        "Sentiment: {} up / {} down",
        format_percent(coin.sentiment_votes_up_percentage),
        format_percent(coin.sentiment_votes_down_percentage)
    );
    if !coin.categories.is_empty() {
        println!("Categories: {}", coin.categories.join(", "));
    }
    println!(
        "Developer score: {}  Community score: {}",
        coin.developer_score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "n/a".to_string()),
        coin.community_score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "n/a".to_string()),
    );

    match coin.market_data() {
        Ok(market) => {
            let usd = |amount: Option<f64>| amount.map(format_usd).unwrap_or_else(|| "-".to_string());
            println!();
            println!("Current price:  {}", usd(market.current_price.usd));
            println!("Market cap:     {}", usd(market.market_cap.usd));
            println!("24h high:       {}", usd(market.high_24h.usd));
            println!("24h low:        {}", usd(market.low_24h.usd));
            println!("Total volume:   {}", usd(market.total_volume.usd));
            if let Some(rank) = market.market_cap_rank {
                println!("Market cap rank: #{}", rank);
            }
        }
        Err(e) => log::warn!("Skipping market data for {}: {}", coin.name, e),
    }

    if !coin.links.is_empty() {
        println!();
        for link in &coin.links {
            println!("{}: {}", link.label(), link.link_value);
        }
    }
}

async fn load_and_print(list: &mut CryptoListController, pending: PendingFetch<CryptoSummary>) {
    list.resolve(pending).await;
    print_view(&list.current_view());
}

async fn browse(mut list: CryptoListController) -> Result<(), Box<dyn std::error::Error>> {
    let pending = list.refresh();
    load_and_print(&mut list, pending).await;
    print_browse_help(list.page_sizes().as_slice());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let view = list.current_view();
        let window = view.window();

        let pending = match parse_browse_command(&line) {
            Some(BrowseCommand::Next) if window.can_go_next() => {
                list.set_page_index(view.page_index + 1)
            }
            Some(BrowseCommand::Next) => {
                println!("Already on the last page.");
                continue;
            }
            Some(BrowseCommand::Prev) if window.can_go_prev() => {
                list.set_page_index(view.page_index - 1)
            }
            Some(BrowseCommand::Prev) => {
                println!("Already on the first page.");
                continue;
            }
            Some(BrowseCommand::Goto(page)) if page > 0 => list.set_page_index(page - 1),
            Some(BrowseCommand::Goto(_)) => {
                println!("Pages are numbered from 1.");
                continue;
            }
            Some(BrowseCommand::Size(size)) => match list.set_page_size(size) {
                Ok(pending) => pending,
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            },
            Some(BrowseCommand::Refresh) => list.refresh(),
            Some(BrowseCommand::Quit) => break,
            Some(BrowseCommand::Help) | None => {
                print_browse_help(list.page_sizes().as_slice());
                continue;
            }
        };

        load_and_print(&mut list, pending).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut config = DashConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url)?;
    }

    let session = global_session();
    if let Some(token) = cli.token {
        session.begin(token);
    }
    let dashboard = Dashboard::new(config, session)?;

    match cli.command {
        Commands::Top => {
            let mut list = dashboard.top_cryptos();
            let pending = list.refresh();
            list.resolve(pending).await;

            let view = list.current_view();
            if let Some(failure) = view.failure {
                eprintln!("Failed to load top cryptocurrencies: {}", failure);
                std::process::exit(1);
            }
            println!("{}", summary_header());
            for (i, coin) in view.items.iter().enumerate() {
                println!("{}", format_summary_row(i + 1, coin));
            }
        }
        Commands::List { page, size } => {
            if page == 0 {
                eprintln!("Pages are numbered from 1.");
                std::process::exit(1);
            }

            let mut list = dashboard.crypto_list();
            if let Some(size) = size {
                // Superseded by the page jump below, so never run.
                let _ = list.set_page_size(size)?;
            }
            let pending = list.set_page_index(page - 1);
            list.resolve(pending).await;

            let view = list.current_view();
            if let Some(failure) = &view.failure {
                eprintln!("Failed to load cryptocurrencies: {}", failure);
                std::process::exit(1);
            }
            print_view(&view);
        }
        Commands::Browse { size } => {
            let mut list = dashboard.crypto_list();
            if let Some(size) = size {
                let _ = list.set_page_size(size)?;
            }
            browse(list).await?;
        }
        Commands::Detail { coin_id } => match dashboard.coin_detail(&coin_id).await {
            Ok(coin) => print_detail(&coin),
            Err(e) => {
                eprintln!("Failed to load coin '{}': {}", coin_id, e);
                std::process::exit(1);
            }
        },
    }

    log::debug!("{} API calls made this run", dashboard.client().call_history().len());

    Ok(())
}
