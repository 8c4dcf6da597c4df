use bl_core::{ArticleStore, Error, Limits, Result};
use bl_scrapers::{BrowserConfig, SearchConfig, DEFAULT_BLOG_URL};
use bl_storage::StorageKind;
use clap::Parser;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_millis = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let factor = match c {
                    'm' if chars.peek() == Some(&'s') => {
                        chars.next();
                        1
                    }
                    's' => 1_000,
                    'm' => 60_000,
                    'h' => 3_600_000,
                    'd' => 86_400_000,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_millis = num
                    .checked_mul(factor)
                    .and_then(|millis| total_millis.checked_add(millis))
                    .ok_or_else(|| format!("Duration too large: {}", s))?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare trailing number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_millis = num
                .checked_mul(1_000)
                .and_then(|millis| total_millis.checked_add(millis))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_millis(total_millis)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Blog acquisition and enrichment pipeline", long_about = None)]
struct Cli {
    /// Article store backend: memory, json or http
    #[arg(long, env = "BL_STORE", default_value = "json")]
    storage: StorageKind,
    /// JSON file path for the json backend, API base URL for the http backend
    #[arg(long, env = "BL_STORE_URL")]
    backend_url: Option<String>,
    #[arg(long, env = "BL_WEBDRIVER_URL", default_value = bl_scrapers::browser::DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,
    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,
    #[arg(long, default_value = bl_inference::DEFAULT_MODEL)]
    model: String,
    /// Chat-completion base URL
    #[arg(long)]
    model_url: Option<String>,
    /// Without a key, articles are passed through unchanged
    #[arg(long, env = bl_inference::API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,
    /// Default log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Crawl the newest listing pages and store new articles
    Crawl {
        #[arg(long, default_value = DEFAULT_BLOG_URL)]
        base_url: String,
        /// Number of trailing listing pages to visit
        #[arg(long, default_value_t = bl_core::config::DEFAULT_PAGE_WINDOW)]
        pages: u32,
    },
    /// Rewrite every stored article that has not been updated yet
    Enrich {
        /// Pause between articles (e.g. 5s, 1m30s, 500ms)
        #[arg(long, default_value = "5s")]
        pacing: HumanDuration,
    },
    /// List stored articles and their enrichment state
    List,
    /// Serve the article CRUD API
    Serve {
        #[arg(long, default_value = bl_web::DEFAULT_ADDR)]
        addr: SocketAddr,
    },
}

impl Cli {
    fn browser_config(&self) -> BrowserConfig {
        BrowserConfig {
            webdriver_url: self.webdriver_url.clone(),
            headless: !self.headed,
            ..BrowserConfig::default()
        }
    }

    fn inference_config(&self, limits: &Limits) -> bl_inference::Config {
        let mut config = bl_inference::Config {
            model_name: self.model.clone(),
            prompt_reference_chars: limits.prompt_reference_chars,
            ..bl_inference::Config::default()
        };
        if let Some(url) = &self.model_url {
            config.base_url = url.clone();
        }
        config.with_api_key(self.api_key.clone())
    }
}

async fn check_storage(store: &Arc<dyn ArticleStore>, kind: StorageKind) -> Result<()> {
    let articles = tokio::time::timeout(STORAGE_CHECK_TIMEOUT, store.get_all())
        .await
        .map_err(|_| Error::Timeout(format!("checking {} storage", kind)))??;
    info!("🏦 Storage ready (using {}, {} articles)", kind, articles.len());
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    if matches!(cli.command, Commands::Serve { .. }) && cli.storage == StorageKind::Http {
        return Err(Error::Config(
            "The API server needs a local backend (memory or json)".to_string(),
        ));
    }

    let store = bl_storage::create_storage(cli.storage, cli.backend_url.as_deref())?;
    info!("💾 Checking storage connection...");
    check_storage(&store, cli.storage).await?;

    match &cli.command {
        Commands::Crawl { base_url, pages } => {
            let limits = Limits::default().with_page_window(*pages);
            let created = bl_scrapers::run_crawl(store, base_url, &cli.browser_config(), limits).await?;
            info!("🦗 Stored {} new article(s)", created.len());
        }
        Commands::Enrich { pacing } => {
            let limits = Limits::default().with_pacing(pacing.0);
            let model = bl_inference::create_model(cli.inference_config(&limits))?;
            info!("🧠 Rewrite model initialized (using {})", model.name());
            let report = bl_scrapers::run_enrichment(
                store,
                bl_inference::Rewriter::new(model),
                &cli.browser_config(),
                SearchConfig::default(),
                limits,
            )
            .await?;
            if !report.failed.is_empty() {
                error!("❌ {} article(s) failed, see log above", report.failed.len());
            }
        }
        Commands::List => bl_scrapers::list_articles(store).await?,
        Commands::Serve { addr } => bl_web::serve(*addr, store).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    bl_scrapers::init_logging(&cli.log_level);
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_human_duration() {
        assert_eq!("5s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(5));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("1m30".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("500ms".parse::<HumanDuration>().unwrap().0, Duration::from_millis(500));
        assert_eq!("0".parse::<HumanDuration>().unwrap().0, Duration::ZERO);
        assert!("".parse::<HumanDuration>().is_err());
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
        assert!("99999999999999999d".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615ms 1ms".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from([
            "bl", "--storage", "memory", "crawl", "--base-url", "https://blog.test/blogs/", "--pages", "5",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageKind::Memory);
        match cli.command {
            Commands::Crawl { base_url, pages } => {
                assert_eq!(base_url, "https://blog.test/blogs/");
                assert_eq!(pages, 5);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["bl", "--storage", "memory", "enrich", "--pacing", "1m"]).unwrap();
        match cli.command {
            Commands::Enrich { pacing } => assert_eq!(pacing.0, Duration::from_secs(60)),
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["bl", "--storage", "sqlite", "list"]).is_err());
    }

    #[test]
    fn test_blank_key_selects_passthrough() {
        let cli = Cli::try_parse_from(["bl", "--api-key", " ", "enrich"]).unwrap();
        assert!(cli.inference_config(&Limits::default()).api_key.is_none());
    }

    #[test]
    fn test_inference_config_follows_limits() {
        let cli = Cli::try_parse_from(["bl", "--model", "gpt-4o-mini", "--model-url", "http://llm.local/v1", "enrich"])
            .unwrap();
        let limits = Limits {
            prompt_reference_chars: 250,
            ..Limits::default()
        };
        let config = cli.inference_config(&limits);
        assert_eq!(config.prompt_reference_chars, 250);
        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://llm.local/v1");
    }

    #[tokio::test]
    async fn test_serve_rejects_http_backend() {
        let cli = Cli::try_parse_from([
            "bl", "--storage", "http", "--backend-url", "http://127.0.0.1:9", "serve",
        ])
        .unwrap();
        assert!(matches!(run(cli).await, Err(Error::Config(_))));
    }
}
