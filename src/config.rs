use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub sparql_endpoint: String,
    /// Prefix turning an RDF graph key into the graph IRI.
    pub rdf_graph_base: String,
    pub graphviz_storage: PathBuf,
    pub dot_binary: String,
    pub rate_limit_ms: u64,
    pub rate_limit_burst: u32,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let sparql_endpoint = env::var("SPARQL_ENDPOINT").context("SPARQL_ENDPOINT must be set")?;

        let bind_addr = var_or("BIND_ADDR", "127.0.0.1:8080")
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        Ok(Config {
            database_url,
            bind_addr,
            sparql_endpoint,
            rdf_graph_base: var_or("RDF_GRAPH_BASE", "https://"),
            graphviz_storage: PathBuf::from(var_or("GRAPHVIZ_STORAGE", "/tmp/graphviz")),
            dot_binary: var_or("DOT_BINARY", "dot"),
            // Default: 200ms/token (~5 req/sec)
            rate_limit_ms: parsed_or("RATE_LIMITER_MILLISECONDS", 200),
            rate_limit_burst: parsed_or("RATE_LIMITER_BURST", 20),
        })
    }
}
