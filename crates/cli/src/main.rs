use anyhow::{anyhow, bail, Context, Result};
use catalog::{Catalog, CatalogRecord, Item, Post, Record};
use catalog_client::CatalogClient;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use controller::{ListConfig, ListController, ListSession, ListState, ViewSnapshot};
use pipeline::{FilterCriteria, KeywordTally, SortMode};
use sources::{CachedFetcher, CatalogSource, PageFetcher, Selector};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tribe - paged shop and community lists
#[derive(Parser)]
#[command(name = "tribe")]
#[command(
    about = "Browse paged, filtered and sorted shop items and community posts",
    long_about = None
)]
struct Cli {
    /// Path to the fixture directory (items.json, posts.json)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Fetch pages from a catalog service instead of the fixtures
    #[arg(long)]
    remote: Option<String>,

    /// JSON list config; TRIBE_* environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Items,
    Posts,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through a list and print the derived view
    Browse {
        #[arg(long, value_enum, default_value = "items")]
        kind: Kind,

        /// Category tab to open (all categories when omitted)
        #[arg(long)]
        category: Option<String>,

        /// Only records whose title or content contains this keyword
        #[arg(long)]
        keyword: Option<String>,

        /// Sort label (추천순, 낮은가격순, 높은가격순, 할인률순, 인기순) or its snake_case name
        #[arg(long, default_value = "추천순")]
        sort: SortMode,

        /// Attribute filter, e.g. --filter size=S,M (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Vec<String>)>,

        /// Number of pages to scroll through
        #[arg(long, default_value = "1")]
        pages: usize,

        /// Override the configured page size
        #[arg(long)]
        page_size: Option<NonZeroUsize>,
    },

    /// Extract and rank search keywords from queries
    Keywords {
        /// Search query (repeatable)
        #[arg(long = "query", required = true)]
        queries: Vec<String>,

        /// Number of keywords to rank
        #[arg(long, default_value_t = pipeline::keywords::DEFAULT_TOP_KEYWORDS)]
        limit: usize,

        /// Count the queries for one searcher, skipping keywords it repeats
        /// within five minutes
        #[arg(long)]
        searcher: Option<String>,
    },

    /// Serve the fixture catalog over gRPC
    Serve {
        #[arg(long, default_value = "127.0.0.1:50061")]
        addr: SocketAddr,

        /// Delay every page response by this many milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Browse {
            kind,
            category,
            keyword,
            sort,
            filters,
            pages,
            page_size,
        } => {
            let mut config = load_config(cli.config.as_deref(), kind)?;
            if let Some(size) = page_size {
                config.page_size = size;
            }

            let mut selector = category.map(Selector::category).unwrap_or_else(Selector::all);
            if let Some(keyword) = keyword {
                selector = selector.with_keyword(keyword);
            }
            let criteria = filters
                .into_iter()
                .fold(FilterCriteria::new(), |criteria, (attribute, values)| {
                    criteria.with(attribute, values)
                });
            let request = BrowseRequest {
                selector,
                criteria,
                sort,
                pages,
            };

            let backend = Backend::open(&cli.data_dir, cli.remote.as_deref()).await?;
            match kind {
                Kind::Items => {
                    let fetcher = backend.fetcher::<Item>(&config);
                    handle_browse(fetcher, &config, request, format_item).await?
                }
                Kind::Posts => {
                    let fetcher = backend.fetcher::<Post>(&config);
                    handle_browse(fetcher, &config, request, format_post).await?
                }
            }
        }
        Commands::Keywords {
            queries,
            limit,
            searcher,
        } => handle_keywords(&queries, limit, searcher.as_deref()),
        Commands::Serve { addr, latency_ms } => {
            if cli.remote.is_some() {
                bail!("serve always uses the fixture catalog; drop --remote");
            }
            let mut source = CatalogSource::new(load_catalog(&cli.data_dir)?);
            if let Some(ms) = latency_ms {
                source = source.with_latency(Duration::from_millis(ms));
            }
            catalog_client::serve(source, addr).await?
        }
    }

    Ok(())
}

fn parse_filter(raw: &str) -> std::result::Result<(String, Vec<String>), String> {
    let (attribute, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected attribute=value[,value...], got {:?}", raw))?;
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(format!("missing attribute name in {:?}", raw));
    }
    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    Ok((attribute.to_string(), values))
}

fn load_config(path: Option<&Path>, kind: Kind) -> Result<ListConfig> {
    let config = match path {
        Some(path) => ListConfig::from_json_file(path)?,
        None if kind == Kind::Posts => ListConfig::posts(),
        None => ListConfig::items(),
    };
    Ok(config.with_env_overrides())
}

fn load_catalog(data_dir: &Path) -> Result<Arc<Catalog>> {
    println!("Loading catalog fixtures from {}...", data_dir.display());
    let start = Instant::now();
    let catalog = Catalog::load_from_dir(data_dir).context("Failed to load catalog fixtures")?;
    println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());
    Ok(Arc::new(catalog))
}

/// Where pages come from
enum Backend {
    Local(CatalogSource),
    Remote(CatalogClient),
}

impl Backend {
    async fn open(data_dir: &Path, remote: Option<&str>) -> Result<Self> {
        match remote {
            Some(addr) => {
                let client = CatalogClient::connect(addr).await?;
                println!("{} Connected to {}", "✓".green(), client.service_address());
                Ok(Backend::Remote(client))
            }
            None => Ok(Backend::Local(CatalogSource::new(load_catalog(data_dir)?))),
        }
    }

    fn fetcher<R>(&self, config: &ListConfig) -> Arc<dyn PageFetcher<R>>
    where
        R: CatalogRecord,
        CatalogClient: PageFetcher<R>,
    {
        let staleness = config.first_page_staleness;
        match self {
            Backend::Local(source) => {
                Arc::new(CachedFetcher::<_, R>::new(source.clone(), staleness))
            }
            Backend::Remote(client) => {
                Arc::new(CachedFetcher::<_, R>::new(client.clone(), staleness))
            }
        }
    }
}

struct BrowseRequest {
    selector: Selector,
    criteria: FilterCriteria,
    sort: SortMode,
    pages: usize,
}

/// Handle the 'browse' command.
///
/// Opens the list on the requested selector, then asks for one more page
/// at a time the way a "load more" button would.
async fn handle_browse<R: Record>(
    fetcher: Arc<dyn PageFetcher<R>>,
    config: &ListConfig,
    request: BrowseRequest,
    format: fn(&R) -> String,
) -> Result<()> {
    let controller = ListController::new(config.page_size)
        .with_selector(request.selector)
        .with_criteria(request.criteria)
        .with_sort_mode(request.sort);
    let mut session = ListSession::spawn(controller, fetcher, config.debounce());

    let settled = |s: &ViewSnapshot<R>| {
        (s.state == ListState::Idle && s.is_ready()) || s.state == ListState::Error
    };

    let start = Instant::now();
    let mut snapshot = session.wait_for(settled).await?;
    for _ in 1..request.pages {
        if !snapshot.has_next_page || snapshot.state == ListState::Error {
            break;
        }
        let before = snapshot.accumulated;
        session.load_next().await?;
        snapshot = session
            .wait_for(|s| (s.accumulated > before && settled(s)) || s.state == ListState::Error)
            .await?;
    }
    let elapsed = start.elapsed();
    session.shutdown().await?;

    print_view(&snapshot, format, elapsed);

    match snapshot.last_error {
        Some(err) => Err(anyhow!(err).context("Failed to fetch the next page")),
        None => Ok(()),
    }
}

/// Handle the 'keywords' command
fn handle_keywords(queries: &[String], limit: usize, searcher: Option<&str>) {
    let mut tally = KeywordTally::new();

    println!("{}", "Extracted keywords:".bold().blue());
    for query in queries {
        let keywords = match searcher {
            Some(searcher) => tally.record_from(searcher, query, Instant::now()),
            None => tally.record(query),
        };
        if keywords.is_empty() {
            println!("  {} {}", query, "(none)".dimmed());
        } else {
            println!("  {} → {}", query, keywords.join(", "));
        }
    }

    println!("{}", format!("Top {} keywords:", limit).bold().blue());
    for (rank, entry) in tally.top(limit).iter().enumerate() {
        println!("{}. {} ({})", (rank + 1).to_string().green(), entry.keyword, entry.count);
    }
}

fn print_view<R>(snapshot: &ViewSnapshot<R>, format: fn(&R) -> String, elapsed: Duration) {
    println!(
        "{}",
        format!("{} · {} · {}", snapshot.selector, snapshot.sort_mode, snapshot.generation)
            .bold()
            .blue()
    );
    println!(
        "{} showing {} of {} fetched{} in {:?}",
        "•".cyan(),
        snapshot.records.len(),
        snapshot.accumulated,
        if snapshot.has_next_page { ", more available" } else { "" },
        elapsed
    );
    if snapshot.records.is_empty() {
        println!("  {}", "No records match.".dimmed());
    }
    for (rank, record) in snapshot.records.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), format(record));
    }
    if let Some(err) = &snapshot.last_error {
        println!("{} {}", "✗".red(), err);
    }
}

fn format_item(item: &Item) -> String {
    let badges = item
        .badge
        .iter()
        .map(|b| format!("[{}]", b.as_str()))
        .collect::<Vec<_>>()
        .join("");
    let discount = if item.discount > 0 {
        format!(" (-{}%)", item.discount).red().to_string()
    } else {
        String::new()
    };
    format!(
        "#{} {} {}원{} {} {}",
        item.id,
        item.title,
        item.price(),
        discount,
        item.size,
        badges.yellow()
    )
}

fn format_post(post: &Post) -> String {
    format!(
        "#{} [{}] {} by {} ♥{}",
        post.id,
        post.category,
        post.title,
        post.author,
        post.like_count()
    )
}
