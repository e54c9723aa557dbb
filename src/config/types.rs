use serde::Deserialize;

/// Main configuration structure for linkrank
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Static URL denylist; listed URLs are never enqueued
    #[serde(default)]
    pub disallow: Vec<String>,

    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default, rename = "partition")]
    pub partitions: Vec<PartitionEntry>,
}

impl Config {
    /// Partition names in crawl order
    pub fn partition_names(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.name.clone()).collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-connections", default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum time between two request starts (milliseconds)
    #[serde(rename = "rate-limit-ms", default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Maximum number of pages stored per partition
    #[serde(
        rename = "max-pages-per-partition",
        default = "default_max_pages_per_partition"
    )]
    pub max_pages_per_partition: u32,

    /// Per-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            rate_limit_ms: default_rate_limit_ms(),
            max_pages_per_partition: default_max_pages_per_partition(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Rank engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    /// Teleportation probability mixed into every transition
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Euclidean distance between successive vectors that ends the iteration
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Hard stop for the power iteration
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Largest partition the dense matrix is built for
    #[serde(rename = "max-pages", default = "default_rank_max_pages")]
    pub max_pages: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            max_pages: default_rank_max_pages(),
        }
    }
}

/// Search server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,

    /// Address announced to the directory service
    #[serde(rename = "public-address", default)]
    pub public_address: Option<String>,

    /// Directory service registration endpoint
    #[serde(rename = "directory-url", default)]
    pub directory_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            public_address: None,
            directory_url: None,
        }
    }
}

/// A named site partition
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionEntry {
    /// Partition name, used in storage and in the search URL path
    pub name: String,

    /// Substrings that classify a URL into this partition.
    /// An empty list makes this partition the catch-all.
    #[serde(rename = "url-patterns", default)]
    pub url_patterns: Vec<String>,

    /// URLs the partition's crawl starts from
    #[serde(default)]
    pub seeds: Vec<String>,
}

fn default_max_connections() -> u32 {
    10
}

fn default_rate_limit_ms() -> u64 {
    200
}

fn default_max_pages_per_partition() -> u32 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_damping() -> f64 {
    0.1
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_max_iterations() -> u32 {
    1000
}

fn default_rank_max_pages() -> usize {
    4096
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}
