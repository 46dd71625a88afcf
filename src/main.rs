use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::BoolishValueParser;
use pica_docs::cache::InMemorySpecCache;
use pica_docs::config::ServiceConfig;
use pica_docs::docs::DocsAdapter;
use pica_docs::fetcher::SupabaseClient;
use pica_docs::server::{self, AppState};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Pica Loco API documentation server")]
struct Cli {
    /// Backend base URL, e.g. https://your-project.supabase.co
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Backend access credential
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    supabase_anon_key: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Path the documentation UI is served under
    #[arg(long, env = "DOCS_PATH", default_value = server::DEFAULT_DOCS_PATH)]
    docs_path: String,

    /// Seconds a fetched document is served before refetching
    #[arg(long, env = "SPEC_CACHE_TTL_SECS", default_value_t = 300)]
    cache_ttl_secs: u64,

    /// Seconds before an outbound fetch is abandoned
    #[arg(long, env = "SPEC_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", value_parser = BoolishValueParser::new())]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    server::init_tracing(cli.log_json);

    tracing::info!(
        "Environment check: SUPABASE_URL {}, SUPABASE_ANON_KEY {}",
        if cli.supabase_url.is_some() { "set" } else { "missing" },
        if cli.supabase_anon_key.is_some() { "set" } else { "missing" },
    );

    let config = match ServiceConfig::new(
        cli.supabase_url.as_deref(),
        cli.supabase_anon_key.as_deref(),
    ) {
        Ok(config) => Arc::new(config),
        Err(err) => {
            tracing::error!("Refusing to start: {}", err);
            return Err(err.into());
        }
    };

    let source = SupabaseClient::with_timeout(
        config.clone(),
        Duration::from_secs(cli.fetch_timeout_secs),
    )
    .context("failed to build HTTP client")?;
    let adapter = Arc::new(DocsAdapter::new(
        config,
        Arc::new(source),
        Arc::new(InMemorySpecCache::new()),
        Duration::from_secs(cli.cache_ttl_secs),
    ));
    let state = match AppState::new(adapter.clone(), &cli.docs_path) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Refusing to start: {}", err);
            return Err(err.into());
        }
    };
    adapter.spawn_initial_fetch();

    server::start_server(&format!("{}:{}", cli.host, cli.port), state).await
}
