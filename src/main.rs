use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use url::Url;

use postgrid::app::{build_http_client, App};
use postgrid::card::{CardContext, LISTING_PATH};
use postgrid::config::Config;
use postgrid::feed::{FeedController, PageContext, PageMode, ViewportGeometry};
use postgrid::index::{IndexFetcher, IndexSource};
use postgrid::location::{build_url, PageLocation, TOPIC_PARAM};
use postgrid::preferences::PreferenceStore;
use postgrid::theme::ThemeVariant;
use postgrid::{snapshot, ui};

/// Viewport assumed for `--html`, where there is no terminal to measure.
const HTML_VIEWPORT: (f64, f64) = (1280.0, 800.0);

/// Get the config directory path (~/.config/postgrid/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("postgrid"))
}

#[derive(Parser, Debug)]
#[command(name = "postgrid", version, about = "Browse a static site's articles as a card grid")]
struct Args {
    /// Article index: a path to index.json or an http(s) URL
    #[arg(long, value_name = "PATH|URL")]
    index: Option<String>,

    /// Site root used for card links and the default index location
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Page location to start from, e.g. "/blog?topic=rust"
    #[arg(long, value_name = "URL")]
    location: Option<String>,

    /// Preselect a topic (sets `topic` on the location)
    #[arg(long)]
    topic: Option<String>,

    /// Page kind: "listing" or "summary"
    #[arg(long, value_name = "MODE")]
    page: Option<String>,

    /// Config file (default: ~/.config/postgrid/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the page's cards as HTML instead of starting the TUI
    #[arg(long)]
    html: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the TUI (or the HTML output), so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_dir = get_config_dir()?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let mode = match &args.page {
        Some(name) => PageMode::from_str_name(name)
            .with_context(|| format!("Unknown page mode '{}': use listing or summary", name))?,
        None => config.page_mode,
    };
    let base_url = args.base_url.clone().unwrap_or_else(|| config.base_url.clone());

    let source = match args.index.as_deref().or(config.index.as_deref()) {
        Some(index) => IndexSource::parse(index),
        None if Url::parse(&base_url).is_ok() => IndexSource::from_base_url(&base_url),
        // A site-relative base: the built site is the working directory
        None => IndexSource::from_base_url("."),
    }
    .context("Invalid index location")?;

    let location = page_location(&args, mode, &base_url);
    let date_style = config.date_style().context("Invalid date_style in config")?;
    let card_context = CardContext::new(base_url.clone(), date_style);
    let controller = FeedController::new(mode, config.layout.clone(), card_context);

    let client = build_http_client().context("Failed to build HTTP client")?;
    let fetcher = IndexFetcher::new(client, source);
    tracing::info!(source = %fetcher.source(), mode = mode.name(), location = %location, "Starting");

    if args.html {
        return print_html(controller, &fetcher, location).await;
    }

    let fallback_theme = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "Unknown theme in config, using light");
        ThemeVariant::default()
    });
    let preferences_path = config_dir.join("preferences.toml");
    let preferences = PreferenceStore::load(&preferences_path).unwrap_or_else(|e| {
        tracing::warn!(path = %preferences_path.display(), error = %e, "Ignoring unreadable preferences");
        PreferenceStore::empty(&preferences_path)
    });

    let mut app = App::new(controller, location, preferences, fallback_theme);
    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }
    app.link_site = link_site(fetcher.source(), &base_url);

    ui::run(&mut app, fetcher).await?;
    Ok(())
}

/// Starting location: `--location`, else the page's own path, plus `--topic`.
fn page_location(args: &Args, mode: PageMode, base_url: &str) -> PageLocation {
    let location = match &args.location {
        Some(raw) => PageLocation::parse(raw),
        None => match mode {
            PageMode::FullListing => PageLocation::parse(&build_url(base_url, &[LISTING_PATH])),
            PageMode::Summary => PageLocation::parse(base_url),
        },
    };
    match &args.topic {
        Some(topic) => location.with_param(TOPIC_PARAM, topic),
        None => location,
    }
}

/// Absolute root that relative card links are opened against.
fn link_site(source: &IndexSource, base_url: &str) -> Option<Url> {
    Url::parse(base_url).ok().or_else(|| match source {
        IndexSource::Remote(url) => Some(url.clone()),
        IndexSource::File(_) => None,
    })
}

async fn print_html(
    mut controller: FeedController,
    fetcher: &IndexFetcher,
    location: PageLocation,
) -> Result<()> {
    let (width, height) = HTML_VIEWPORT;
    let page = PageContext::new(location, ViewportGeometry::new(width, height));
    let delta = controller.initialize(fetcher, page).await;
    let failed = controller.has_failed();

    print!("{}", snapshot::render_page_html(&mut controller, delta));
    if failed {
        anyhow::bail!("Failed to load the article index from {}", fetcher.source());
    }
    Ok(())
}
