//! Swapboard CLI
//!
//! Command-line interface for the swapboard marketplace client.
//! Provides one-shot commands and an interactive browser.

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use swapboard::api::item_url;
use swapboard::config::{self, AppConfig};
use swapboard::geo::format_distance;
use swapboard::poll::{PollEvent, UnreadPoller};
use swapboard::search::parse_distance;
use swapboard::storage::{LocalStore, SearchHistory};
use swapboard::{Coordinates, FilterUpdate, Item, MarketClient, SearchStore, SortOrder};
use std::time::Duration;

/// Swapboard - browse a community item-exchange marketplace
///
/// Search listings with filters and paging, open item pages,
/// and keep an eye on unread messages from the terminal.
#[derive(Parser)]
#[command(name = "swapboard")]
#[command(version)]
#[command(about = "Terminal client for a community item-exchange marketplace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search listed items
    Search {
        /// Free-text query
        query: Option<String>,

        /// Only items in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only items listed at this location
        #[arg(short, long)]
        location: Option<String>,

        /// Only items in this condition (e.g. like-new)
        #[arg(long)]
        condition: Option<String>,

        /// Sort order: recent, oldest, az, za
        #[arg(short, long)]
        sort: Option<SortOrder>,

        /// Search radius in kilometres around --near
        #[arg(short, long, value_parser = parse_distance)]
        distance: Option<f64>,

        /// Origin for distance filtering, as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        near: Option<Coordinates>,

        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Items per page (default from config)
        #[arg(long)]
        limit: Option<u32>,

        /// Print the raw page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single item
    Item {
        /// Item id
        id: String,

        /// Open the item page in the browser
        #[arg(long)]
        open: bool,

        /// Print the item as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive terminal browser
    Browse {
        /// Initial query
        query: Option<String>,
    },

    /// Show the unread message count
    Unread {
        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Options for the search command
struct SearchArgs {
    update: FilterUpdate,
    page: u32,
    limit: Option<u32>,
    json: bool,
}

fn main() {
    // Initialize logging
    swapboard::logging::init();
    swapboard::logging::separator("swapboard starting");

    let cli = Cli::parse();

    let result = AppConfig::load().and_then(|config| match cli.command {
        Commands::Search {
            query,
            category,
            location,
            condition,
            sort,
            distance,
            near,
            page,
            limit,
            json,
        } => cmd_search(
            &config,
            SearchArgs {
                update: FilterUpdate {
                    query,
                    category,
                    location,
                    condition,
                    distance,
                    sort,
                    coordinates: near.map(Some),
                },
                page,
                limit,
                json,
            },
        ),

        Commands::Item { id, open, json } => cmd_item(&config, &id, open, json),

        Commands::Browse { query } => swapboard::tui::run(config, query.as_deref()),

        Commands::Unread { watch } => cmd_unread(&config, watch),

        Commands::History { clear } => cmd_history(&config, clear),

        Commands::Config => cmd_config(&config),
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("{} {}", style("Error:").red().bold(), e.user_message());
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Search command implementation
fn cmd_search(config: &AppConfig, args: SearchArgs) -> swapboard::Result<()> {
    let client = MarketClient::from_config(config)?;
    let mut store = SearchStore::new(args.limit.unwrap_or(config.page_size));
    store.update_filters(args.update);
    store.seek_page(args.page);

    let pb = (!args.json).then(|| spinner("Searching..."));
    let result = store.search(&client).map(|items| items.len());
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    result?;

    let filters = store.filters();
    let query = filters.query.trim().to_string();
    if !query.is_empty() {
        let local = LocalStore::open(config::store_file());
        if let Err(e) = SearchHistory::new(&local, config.history_limit).record(&query) {
            tracing::warn!(error = %e, "failed to save search history");
        }
    }

    let page = store.page();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "items": store.items(),
                "total": page.total(),
                "page": page.current_page(),
                "total_pages": page.total_pages(),
                "page_size": page.page_size(),
            }))?
        );
        return Ok(());
    }

    let summary = filters.summary();
    println!(
        "{} {}",
        style("→").cyan().bold(),
        if summary.is_empty() {
            "All items".to_string()
        } else {
            summary
        }
    );
    println!();

    if store.items().is_empty() {
        println!("  {}", style("No items match these filters.").dim());
        return Ok(());
    }

    let now = chrono::Utc::now();
    for (i, item) in store.items().iter().enumerate() {
        let number = page.offset() + i as u64 + 1;
        println!(
            "{} {}  {}",
            style(format!("{:3}.", number)).dim(),
            style(&item.title).bold(),
            style(&item.id).dim()
        );

        let mut details = vec![item.category.clone(), item.condition.clone(), item.location.clone()];
        if let Some(km) = filters.coordinates.and_then(|o| item.distance_from(&o)) {
            details.push(format_distance(km));
        }
        details.push(swapboard::format_age(item.created_at, now));
        details.retain(|d| !d.is_empty());
        println!("     {}", style(details.join(" · ")).cyan());
    }

    println!();
    let window: Vec<String> = page
        .window(config.max_visible_pages)
        .into_iter()
        .map(|n| {
            if n == page.current_page() {
                format!("[{}]", n)
            } else {
                n.to_string()
            }
        })
        .collect();
    if let Some((first, last)) = page.item_range() {
        println!(
            "Showing {}–{} of {}   page {} of {}   {}",
            first,
            last,
            style(page.total()).green(),
            page.current_page(),
            page.total_pages(),
            style(window.join(" ")).dim()
        );
    }

    Ok(())
}

/// Item command implementation
fn cmd_item(config: &AppConfig, id: &str, open: bool, json: bool) -> swapboard::Result<()> {
    let client = MarketClient::from_config(config)?;

    let pb = (!json).then(|| spinner("Loading item..."));
    let result = client.item(id);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let item = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_item(config, &item);
    }

    if open {
        let url = item_url(&config.web_base_url, &item.id)?;
        open::that(&url)?;
        println!("{} Opened {}", style("✓").green().bold(), style(url).cyan());
    }
    Ok(())
}

fn print_item(config: &AppConfig, item: &Item) {
    println!("{}", style(&item.title).bold());
    println!();

    let rows = [
        ("Category:", item.category.clone()),
        ("Condition:", item.condition.clone()),
        ("Location:", item.location.clone()),
        ("Owner:", item.owner_name().to_string()),
        ("Listed:", swapboard::format_timestamp(item.created_at)),
        ("Image:", item.first_image().unwrap_or_default().to_string()),
        (
            "Link:",
            item_url(&config.web_base_url, &item.id).unwrap_or_default(),
        ),
    ];
    for (label, value) in rows.iter().filter(|(_, v)| !v.is_empty()) {
        println!("  {} {}", style(format!("{:<10}", label)).bold(), value);
    }

    if !item.description.trim().is_empty() {
        println!();
        for line in item.description.lines() {
            println!("  {}", line);
        }
    }
}

/// Unread command implementation
fn cmd_unread(config: &AppConfig, watch: bool) -> swapboard::Result<()> {
    let client = MarketClient::from_config(config)?;

    if !watch {
        let count = client.unread_count()?;
        println!("{} {} unread", style("✉").cyan().bold(), style(count).yellow());
        return Ok(());
    }

    println!(
        "{} Watching unread messages every {}s",
        style("→").cyan().bold(),
        config.poll_interval().as_secs()
    );
    println!("Press Ctrl+C to stop.");
    println!();

    let poller = UnreadPoller::spawn(config.poll_interval(), move || client.unread_count());
    for event in poller.events().iter() {
        let now = chrono::Local::now().format("%H:%M:%S");
        match event {
            PollEvent::Unread(count) => {
                println!("  {} {} unread", style(now).dim(), style(count).yellow());
            }
            PollEvent::Failed(message) => {
                println!("  {} {}", style(now).dim(), style(message).red());
            }
        }
    }
    Ok(())
}

/// History command implementation
fn cmd_history(config: &AppConfig, clear: bool) -> swapboard::Result<()> {
    let local = LocalStore::open(config::store_file());
    let history = SearchHistory::new(&local, config.history_limit);

    if clear {
        history.clear()?;
        println!("{} Search history cleared", style("✓").green().bold());
        return Ok(());
    }

    let entries = history.entries();
    if entries.is_empty() {
        println!("  {}", style("No recent searches.").dim());
    }
    for (i, query) in entries.iter().enumerate() {
        println!("{} {}", style(format!("{:3}.", i + 1)).dim(), query);
    }
    Ok(())
}

/// Config command implementation
fn cmd_config(config: &AppConfig) -> swapboard::Result<()> {
    let mut shown = config.clone();
    if shown.auth_token.is_some() {
        shown.auth_token = Some("********".to_string());
    }

    println!("{}", serde_json::to_string_pretty(&shown)?);
    println!();
    println!("  {} {}", style("Config file:").bold(), config::config_file().display());
    println!("  {} {}", style("Data file:").bold(), config::store_file().display());
    println!(
        "  {} {}",
        style("Log file:").bold(),
        swapboard::logging::log_path().display()
    );
    Ok(())
}
