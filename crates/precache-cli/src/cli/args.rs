use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "precache",
    version,
    about = "Cache-first fetch worker: pre-cache a seed list, serve from cache, fall back to the network"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML config file
    #[arg(long, global = true, env = "PRECACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin that relative paths resolve against
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Cache store identifier
    #[arg(long, global = true)]
    pub cache_name: Option<String>,

    /// Root directory for cache stores
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pre-cache the seed list into the configured store (all or nothing)
    Install(InstallArgs),
    /// Fetch a path or URL, serving from the store first
    Fetch(FetchArgs),
    /// List entries in the configured store
    List(ListArgs),
    /// List cache stores under the cache root
    Caches,
    /// Delete a cache store
    DeleteCache(DeleteCacheArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Root-relative path or absolute URL
    pub target: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body, sent as-is
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Print status line and headers before the body
    #[arg(short, long)]
    pub include: bool,

    /// Write the body to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteCacheArgs {
    /// Name of the store to delete
    pub name: String,
}
