use std::net;

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
pub struct Config {
    pub db: Db,
    pub http: Http,
}

#[derive(Deserialize)]
pub struct Db {
    pub url: String,

    /// Most rows the store hands back per page request. A zero here
    /// would read every collection as empty, so it fails to parse.
    #[serde(
        default = "default_fetch_page_size",
        deserialize_with = "nonzero_page_size"
    )]
    pub fetch_page_size: usize,
}

fn default_fetch_page_size() -> usize {
    1000
}

fn nonzero_page_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match usize::deserialize(deserializer)? {
        0 => Err(de::Error::custom("fetch_page_size must be at least 1")),
        size => Ok(size),
    }
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    pub cors: Cors,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Deserialize)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}
