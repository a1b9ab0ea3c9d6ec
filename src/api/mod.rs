pub mod shop;
pub mod ticket;

use serde::{Deserialize, Serialize};

pub use self::{shop::Shop, ticket::Ticket};

/// Body of every non-2xx response.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Error {
    pub error: String,
}

/// Confirmation body for operations with nothing else to return.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub message: String,
}
