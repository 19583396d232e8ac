//! AgriSignals CLI
//!
//! Load commodity signals, filter them by category and watch live score
//! simulation from the terminal.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use agri_core::{
    commodity_groups, regional_heatmap, risk_split, top_alerts, Alpha, Severity, Signal,
    SignalId, Snapshot, ALERT_THRESHOLD, CATEGORY_TICK_MS, DASHBOARD_TICK_MS,
};
use agri_feed::{PriceBoard, RemoteConfig, SourceConfig};
use agri_runtime::{broadcast, LiveScoreSimulator, LogSink, SharedSink, SignalStore};

use config::EngineConfig;

#[derive(Parser)]
#[command(name = "agrisignals")]
#[command(author, version, about = "AgriSignals: commodity signal feed engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,

    /// Engine config file (TOML)
    #[arg(short, long, env = "AGRISIGNALS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured source kind
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Fixture file (implies --source fixture)
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Signals API root (implies --source remote)
    #[arg(long, env = "AGRISIGNALS_API_URL")]
    api_url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    Fixture,
    Remote,
    Generated,
}

#[derive(Subcommand)]
enum Commands {
    /// List the category table
    Categories,

    /// Load and print signals
    List {
        /// Only signals in this category
        #[arg(short = 'k', long)]
        category: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one signal and its alpha
    Show {
        /// Signal id (numeric or string)
        #[arg(short, long)]
        id: String,
    },

    /// Run the live score simulator and print every snapshot
    Watch {
        /// Only signals in this category
        #[arg(short = 'k', long)]
        category: Option<String>,

        /// Tick interval in milliseconds
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Stop after this many ticks (0 = until Ctrl-C)
        #[arg(short, long, default_value = "0")]
        ticks: u64,

        /// Seed for a reproducible walk
        #[arg(long)]
        seed: Option<u64>,

        /// Send signals crossing the alert threshold to the log sink
        #[arg(long)]
        notify: bool,
    },

    /// Print alerts, commodity groups and the regional heatmap
    Digest {
        /// Only signals in this category
        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Print the mock price board
    Prices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let mut engine = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    apply_source_overrides(&mut engine, &cli);

    match cli.command {
        Commands::Categories => {
            print_categories(&engine)?;
        }
        Commands::List { category, json } => {
            let store = build_store(&engine)?;
            let signals = load_filtered(&store, category.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&signals)?);
            } else {
                print_signals(&signals);
            }
        }
        Commands::Show { id } => {
            let store = build_store(&engine)?;
            show_signal(&store, &SignalId::parse(&id)).await?;
        }
        Commands::Watch {
            category,
            interval,
            ticks,
            seed,
            notify,
        } => {
            let store = build_store(&engine)?;
            let interval_ms = interval
                .or(engine.simulator.interval_ms)
                .unwrap_or(if category.is_some() {
                    CATEGORY_TICK_MS
                } else {
                    DASHBOARD_TICK_MS
                });
            let seed = seed.or(engine.simulator.seed);
            watch(&store, category.as_deref(), interval_ms, ticks, seed, notify).await?;
        }
        Commands::Digest { category } => {
            let store = build_store(&engine)?;
            let signals = load_filtered(&store, category.as_deref()).await?;
            print_digest(&signals);
        }
        Commands::Prices => {
            print_prices();
        }
    }

    Ok(())
}

fn apply_source_overrides(engine: &mut EngineConfig, cli: &Cli) {
    if let Some(path) = &cli.fixture {
        engine.source = SourceConfig::Fixture { path: path.clone() };
    } else if let Some(url) = &cli.api_url {
        let mut remote = match &engine.source {
            SourceConfig::Remote(remote) => remote.clone(),
            _ => RemoteConfig::default(),
        };
        remote.base_url = url.clone();
        engine.source = SourceConfig::Remote(remote);
    }

    match cli.source {
        Some(SourceKind::Fixture) if !matches!(engine.source, SourceConfig::Fixture { .. }) => {
            engine.source = SourceConfig::default();
        }
        Some(SourceKind::Remote) if !matches!(engine.source, SourceConfig::Remote(_)) => {
            engine.source = SourceConfig::Remote(RemoteConfig::default());
        }
        Some(SourceKind::Generated) => {
            engine.source = SourceConfig::Generated;
        }
        _ => {}
    }
}

fn build_store(engine: &EngineConfig) -> Result<SignalStore> {
    let categories = engine.category_table()?;
    Ok(SignalStore::new(&engine.source, categories)?)
}

async fn load_filtered(store: &SignalStore, category: Option<&str>) -> Result<Vec<Signal>> {
    let all = store.load_all().await?;
    match category {
        Some(name) => Ok(store.filter_category(&all, name)?),
        None => Ok(all.to_vec()),
    }
}

fn print_categories(engine: &EngineConfig) -> Result<()> {
    let table = engine.category_table()?;
    println!("📂 {} categories\n", table.len());
    for category in table.iter() {
        println!("{}", category.name);
        if !category.commodity_keywords.is_empty() {
            println!("   commodity: {}", category.commodity_keywords.join(", "));
        }
        if !category.headline_keywords.is_empty() {
            println!("   headline:  {}", category.headline_keywords.join(", "));
        }
    }
    Ok(())
}

fn print_signals(signals: &[Signal]) {
    if signals.is_empty() {
        println!("No signals.");
        return;
    }

    for signal in signals {
        let severity = Severity::of(signal.score);
        let commodity = signal.commodity.as_deref().unwrap_or("-");
        println!(
            "{:>8}  {:>5.1}  {:<9} {:<8} {}",
            signal.id.to_string(),
            signal.score,
            severity.label(),
            commodity,
            signal.headline
        );
    }
}

async fn show_signal(store: &SignalStore, id: &SignalId) -> Result<()> {
    let signal = store.fetch_by_id(id).await?;
    let alpha = Alpha::from(&signal);

    println!("📡 {}", signal.headline);
    println!(
        "   id: {}  score: {:.1} ({})",
        signal.id,
        signal.score,
        Severity::of(signal.score).label()
    );

    let location = signal.location();
    if !location.is_empty() {
        println!("   location: {}", location);
    }
    if let Some(commodity) = &signal.commodity {
        println!("   commodity: {}", commodity);
    }
    if let (Some(price), Some(change), Some(pct)) =
        (signal.price, signal.change, signal.change_percent)
    {
        println!("   price: ${:.2} ({:+.2}, {:+.1}%)", price, change, pct);
    }
    if let Some(source) = &signal.source {
        println!("   source: {}", source);
    }

    println!("\n💡 Alpha");
    let fields = [
        ("So what", &alpha.so_what),
        ("Who bleeds", &alpha.who_bleeds),
        ("Who benefits", &alpha.who_benefits),
        ("Tradecraft", &alpha.tradecraft),
    ];
    for (label, value) in fields {
        if let Some(text) = value {
            println!("   {}: {}", label, text);
        }
    }
    if let Some(strength) = &signal.signal_strength {
        println!("   Signal: {}", strength);
    }

    Ok(())
}

async fn watch(
    store: &SignalStore,
    category: Option<&str>,
    interval_ms: u64,
    max_ticks: u64,
    seed: Option<u64>,
    notify: bool,
) -> Result<()> {
    let signals = load_filtered(store, category).await?;
    if signals.is_empty() {
        warn!("Nothing to simulate: no signals matched");
        return Ok(());
    }

    let sinks: Vec<SharedSink> = if notify {
        vec![Arc::new(LogSink)]
    } else {
        Vec::new()
    };

    println!(
        "📈 Watching {} signals ({}), tick every {}ms\n",
        signals.len(),
        category.unwrap_or("all"),
        interval_ms
    );
    print_signals(&signals);

    let mut previous: Snapshot = signals.clone().into();
    let mut simulator = LiveScoreSimulator::with_seed(seed);
    let mut stream = simulator.start(signals, Duration::from_millis(interval_ms));

    loop {
        let tick = tokio::select! {
            tick = stream.next() => tick,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(tick) = tick else { break };

        println!("\n⏱️  tick {} @ {}", tick.seq, tick.at.format("%H:%M:%S"));
        print_signals(&tick.snapshot);

        for (before, after) in previous.iter().zip(tick.snapshot.iter()) {
            if before.score <= ALERT_THRESHOLD && after.score > ALERT_THRESHOLD {
                broadcast(&sinks, after).await;
            }
        }
        previous = tick.snapshot;

        if max_ticks > 0 && tick.seq >= max_ticks {
            break;
        }
    }

    simulator.stop();
    Ok(())
}

fn print_digest(signals: &[Signal]) {
    println!("🚨 Top alerts");
    let alerts = top_alerts(signals, 3);
    if alerts.is_empty() {
        println!("   none above {:.0}", ALERT_THRESHOLD);
    }
    for signal in alerts {
        println!("   {:>5.1}  {}", signal.score, signal.headline);
    }

    println!("\n🌾 Commodities");
    for group in commodity_groups(signals) {
        println!(
            "   {:<10} {:>5.1} avg over {} signal(s)",
            group.key,
            group.avg_score,
            group.signals.len()
        );
    }

    println!("\n🗺️  Regional heatmap");
    for region in regional_heatmap(signals) {
        println!("   {:<14} {:>5.1}", region.key, region.avg_score);
    }

    let split = risk_split(signals);
    println!(
        "\n📊 {} risk zone(s), {} opportunity zone(s)",
        split.risk.len(),
        split.opportunity.len()
    );
}

fn print_prices() {
    let board = PriceBoard;
    let now = chrono::Utc::now();
    let mut rng = rand::thread_rng();

    println!("💲 Mock price board\n");
    for commodity in board.commodities() {
        if let Some(quote) = board.quote(commodity, &mut rng, now) {
            println!(
                "   {:<7} {:<12} ${:>6.2}  {:+.2} ({:+.1}%)",
                quote.symbol, quote.name, quote.price, quote.change, quote.change_percent
            );
        }
    }
}
