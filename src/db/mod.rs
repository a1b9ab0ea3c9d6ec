pub mod ticket;

use async_trait::async_trait;
use derive_more::{Display, From};
use itertools::Itertools as _;
use tokio_postgres::{tls::NoTlsStream, NoTls, Socket};

use crate::config;

pub use self::ticket::Ticket;

pub type Connection = tokio_postgres::Connection<Socket, NoTlsStream>;

pub async fn connect(
    config: config::Db,
) -> Result<(Client, Connection), Error> {
    let (client, connection) =
        tokio_postgres::connect(&config.url, NoTls).await?;
    let client = Client {
        inner: client,
        page_limit: config.fetch_page_size,
    };
    Ok((client, connection))
}

pub struct Client {
    inner: tokio_postgres::Client,
    page_limit: usize,
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    #[from]
    Postgres(tokio_postgres::Error),

    /// Store failed or refused the request for a non-protocol reason.
    #[display("store unavailable: {_0}")]
    Unavailable(String),
}

impl std::error::Error for Error {}

/// Handle to the ticket table of the backing store.
#[async_trait]
pub trait Store: Send + Sync {
    /// One range-bounded page of ticket records, in stable `id` order.
    async fn get_tickets_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Ticket>, Error>;

    /// The `shop` value of every ticket record, duplicates included.
    async fn get_shop_rows(&self) -> Result<Vec<String>, Error>;

    /// Inserts a complete record. A duplicate `id` is left to the store's
    /// own uniqueness constraint to reject.
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), Error>;

    /// Overwrites the whole record at `ticket.id`. Last write wins; a
    /// missing `id` writes nothing and is not an error.
    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), Error>;

    /// Removing a missing `id` is not an error.
    async fn delete_ticket(&self, id: &ticket::Id) -> Result<(), Error>;

    /// Most rows the store hands back per page request.
    fn page_limit(&self) -> usize;

    /// The complete ticket collection, however many page requests it takes.
    ///
    /// Issues successive range-bounded requests and concatenates the results
    /// until the store returns an empty page. The first failed page request
    /// fails the whole fetch.
    async fn get_all_tickets(&self) -> Result<Vec<Ticket>, Error> {
        let limit = self.page_limit();
        let mut tickets = Vec::new();
        loop {
            let page = self.get_tickets_page(tickets.len(), limit).await?;
            if page.is_empty() {
                return Ok(tickets);
            }
            tickets.extend(page);
        }
    }

    /// Distinct shop names across all tickets, sorted without regard
    /// to case.
    async fn get_shop_names(&self) -> Result<Vec<String>, Error> {
        let rows = self.get_shop_rows().await?;
        // Ties break on the exact string, which keeps duplicates
        // adjacent for dedup.
        Ok(rows
            .into_iter()
            .sorted_by(|a, b| {
                a.to_lowercase()
                    .cmp(&b.to_lowercase())
                    .then_with(|| a.cmp(b))
            })
            .dedup()
            .collect())
    }
}
