use serde::{Deserialize, Serialize};
use time::Date;

pub use crate::db::ticket::{Id, Priority, Status};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ticket {
    pub id: Id,
    pub description: String,
    pub status: Status,
    pub location: String,
    pub request_date: Date,
    pub shop: String,
    pub priority: Priority,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub tickets: Vec<Ticket>,
    pub total_pages: usize,
}

/// Per-status ticket tallies keyed by the status name itself.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct StatusCounts {
    #[serde(rename = "Open")]
    pub open: usize,

    #[serde(rename = "WIP")]
    pub wip: usize,

    #[serde(rename = "Completed")]
    pub completed: usize,

    #[serde(rename = "Assigned")]
    pub assigned: usize,

    #[serde(rename = "Cancelled")]
    pub cancelled: usize,
}

/// Twelve-month ticket volume curve for one shop, January first.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Trend {
    pub labels: [String; 12],
    pub data: [usize; 12],
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Created {
    pub message: String,
    pub data: Ticket,
}
