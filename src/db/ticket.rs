use std::error::Error as StdError;

use async_trait::async_trait;
use derive_more::Display;
use enum_utils::FromStr;
use serde::{Deserialize, Serialize};
use time::Date;
use tokio_postgres::types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};

use super::{Client, Error, Store};

#[derive(Clone, Debug)]
pub struct Ticket {
    pub id: Id,
    pub description: String,
    pub status: Status,
    pub location: String,
    pub request_date: Date,
    pub shop: String,
    pub priority: Priority,
}

/// Client-supplied ticket identifier, conventionally `"YY-NNNNN"`. The
/// format is not enforced here.
#[derive(Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub struct Id(String);

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl FromSql<'_> for Id {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        String::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for Id {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, FromStr, PartialEq, Serialize,
)]
pub enum Status {
    /// Filed and waiting to be picked up.
    Open,

    /// Work in progress.
    WIP,

    /// Work finished.
    Completed,

    /// Handed to a shop, work not started yet.
    Assigned,

    /// Withdrawn without being worked.
    Cancelled,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::WIP => "WIP",
            Self::Completed => "Completed",
            Self::Assigned => "Assigned",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FromSql<'_> for Status {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = <&str>::from_sql(ty, raw)?;
        let status = repr.parse().map_err(|_| "invalid status")?;
        Ok(status)
    }
}

impl ToSql for Status {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.as_str().to_sql(ty, out)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, FromStr, PartialEq, Serialize,
)]
pub enum Priority {
    Low,

    /// Accepts the legacy `Routine` spelling on input, never emits it.
    #[serde(alias = "Routine")]
    Medium,

    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromSql<'_> for Priority {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = <&str>::from_sql(ty, raw)?;
        // Rows written before the rename still carry "Routine".
        if repr == "Routine" {
            return Ok(Self::Medium);
        }
        let priority = repr.parse().map_err(|_| "invalid priority")?;
        Ok(priority)
    }
}

impl ToSql for Priority {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.as_str().to_sql(ty, out)
    }
}

#[async_trait]
impl Store for Client {
    async fn get_tickets_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Ticket>, Error> {
        let offset = i64::try_from(offset).unwrap();
        let limit = i64::try_from(limit).unwrap();

        const SQL: &str = "\
            SELECT id, description, status, location, \
                   request_date, shop, priority \
            FROM ticket_info \
            ORDER BY id \
            OFFSET $1 LIMIT $2";
        Ok(self
            .inner
            .query(SQL, &[&offset, &limit])
            .await?
            .into_iter()
            .map(|row| Ticket {
                id: row.get("id"),
                description: row.get("description"),
                status: row.get("status"),
                location: row.get("location"),
                request_date: row.get("request_date"),
                shop: row.get("shop"),
                priority: row.get("priority"),
            })
            .collect())
    }

    async fn get_shop_rows(&self) -> Result<Vec<String>, Error> {
        const SQL: &str = "SELECT shop FROM ticket_info";
        Ok(self
            .inner
            .query(SQL, &[])
            .await?
            .into_iter()
            .map(|row| row.get("shop"))
            .collect())
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO ticket_info (id, description, status, location, \
                                     request_date, shop, priority) \
            VALUES ($1, $2, $3, $4, $5, $6, $7)";

        self.inner
            .execute(
                SQL,
                &[
                    &ticket.id,
                    &ticket.description,
                    &ticket.status,
                    &ticket.location,
                    &ticket.request_date,
                    &ticket.shop,
                    &ticket.priority,
                ],
            )
            .await?;
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        const SQL: &str = "\
            UPDATE ticket_info \
            SET description = $2, \
                status = $3, \
                location = $4, \
                request_date = $5, \
                shop = $6, \
                priority = $7 \
            WHERE id = $1";

        self.inner
            .execute(
                SQL,
                &[
                    &ticket.id,
                    &ticket.description,
                    &ticket.status,
                    &ticket.location,
                    &ticket.request_date,
                    &ticket.shop,
                    &ticket.priority,
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete_ticket(&self, id: &Id) -> Result<(), Error> {
        const SQL: &str = "DELETE FROM ticket_info WHERE id = $1";
        self.inner.execute(SQL, &[id]).await?;
        Ok(())
    }

    fn page_limit(&self) -> usize {
        self.page_limit
    }
}
