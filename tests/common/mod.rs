use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use time::Date;
use tokio::{net, task};

use ticketify::{
    api,
    db::{self, ticket::Status},
    server,
};

/// In-memory stand-in for the ticket table, paged like the real store.
pub struct MemStore {
    tickets: Mutex<Vec<db::Ticket>>,
    page_limit: usize,
    broken: bool,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tickets: Mutex::new(Vec::new()),
            page_limit: 100,
            broken: false,
        }
    }

    pub fn seeded(tickets: Vec<db::Ticket>) -> Self {
        Self {
            tickets: Mutex::new(tickets),
            ..Self::new()
        }
    }

    /// Every call fails, as if the store were unreachable.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::new()
        }
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }
}

#[async_trait]
impl db::Store for MemStore {
    async fn get_tickets_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<db::Ticket>, db::Error> {
        if self.broken {
            return Err(unavailable());
        }
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn get_shop_rows(&self) -> Result<Vec<String>, db::Error> {
        if self.broken {
            return Err(unavailable());
        }
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets.iter().map(|ticket| ticket.shop.clone()).collect())
    }

    async fn insert_ticket(
        &self,
        ticket: &db::Ticket,
    ) -> Result<(), db::Error> {
        if self.broken {
            return Err(unavailable());
        }
        let mut tickets = self.tickets.lock().unwrap();
        if tickets.iter().any(|t| t.id == ticket.id) {
            return Err(db::Error::Unavailable(
                "duplicate key value violates unique constraint".to_owned(),
            ));
        }
        tickets.push(ticket.clone());
        Ok(())
    }

    async fn update_ticket(
        &self,
        ticket: &db::Ticket,
    ) -> Result<(), db::Error> {
        if self.broken {
            return Err(unavailable());
        }
        let mut tickets = self.tickets.lock().unwrap();
        if let Some(found) = tickets.iter_mut().find(|t| t.id == ticket.id) {
            *found = ticket.clone();
        }
        Ok(())
    }

    async fn delete_ticket(
        &self,
        id: &db::ticket::Id,
    ) -> Result<(), db::Error> {
        if self.broken {
            return Err(unavailable());
        }
        let mut tickets = self.tickets.lock().unwrap();
        tickets.retain(|ticket| ticket.id != *id);
        Ok(())
    }

    fn page_limit(&self) -> usize {
        self.page_limit
    }
}

fn unavailable() -> db::Error {
    db::Error::Unavailable("store offline".to_owned())
}

pub fn ticket(
    id: &str,
    status: Status,
    request_date: Date,
    shop: &str,
) -> db::Ticket {
    db::Ticket {
        id: id.into(),
        description: format!("Ticket {id}"),
        status,
        location: "Building 4".to_owned(),
        request_date,
        shop: shop.to_owned(),
        priority: api::ticket::Priority::Medium,
    }
}

pub struct Client {
    inner: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Serves the app over `store` on an ephemeral port and returns a
    /// client pointed at it.
    pub async fn start(store: MemStore) -> Self {
        let app = server::app(Arc::new(server::AppState {
            store: Box::new(store),
        }));

        let listener = net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind a port");
        let addr = listener.local_addr().expect("failed to get the address");

        task::spawn(async move {
            axum::serve(listener, app).await.expect("server failed");
        });

        Self {
            inner: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    pub async fn get_tickets(&self) -> Result<Vec<api::Ticket>, StatusCode> {
        Ok(self
            .inner
            .get(format!("{}/tickets", self.base_url))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<Vec<api::Ticket>>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn count_by_month(
        &self,
        month: u8,
    ) -> Result<api::ticket::StatusCounts, StatusCode> {
        Ok(self
            .inner
            .get(format!("{}/tickets/by-month?month={month}", self.base_url))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::ticket::StatusCounts>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn list(
        &self,
        month: u8,
        status: &str,
        page: usize,
        size: usize,
    ) -> Result<api::ticket::List, StatusCode> {
        self.list_with_query(&format!(
            "?month={month}&status={status}&page={page}&size={size}"
        ))
        .await
    }

    pub async fn list_with_query(
        &self,
        query: &str,
    ) -> Result<api::ticket::List, StatusCode> {
        Ok(self
            .inner
            .get(format!("{}/tickets/list{query}", self.base_url))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::ticket::List>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn trend_by_shop(
        &self,
        shop: &str,
    ) -> Result<api::ticket::Trend, StatusCode> {
        Ok(self
            .inner
            .get(format!("{}/tickets/by-shop?shop={shop}", self.base_url))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::ticket::Trend>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn shops(&self) -> Result<Vec<api::Shop>, StatusCode> {
        Ok(self
            .inner
            .get(format!("{}/shops", self.base_url))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<Vec<api::Shop>>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn search(
        &self,
        keyword: &str,
    ) -> Result<Vec<api::Ticket>, StatusCode> {
        Ok(self
            .inner
            .get(format!(
                "{}/search/by-keyword?keyword={keyword}",
                self.base_url
            ))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<Vec<api::Ticket>>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn add_ticket(
        &self,
        ticket: &api::Ticket,
    ) -> Result<api::ticket::Created, StatusCode> {
        Ok(self
            .inner
            .post(format!("{}/search/submit-form", self.base_url))
            .json(ticket)
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::ticket::Created>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn edit_ticket(
        &self,
        id: &api::ticket::Id,
        ticket: &api::Ticket,
    ) -> Result<api::Ticket, StatusCode> {
        Ok(self
            .inner
            .put(format!("{}/search/ticket/{id}", self.base_url))
            .json(ticket)
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Ticket>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn delete_ticket(
        &self,
        id: &api::ticket::Id,
    ) -> Result<api::Message, StatusCode> {
        Ok(self
            .inner
            .delete(format!("{}/search/ticket/{id}", self.base_url))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Message>()
            .await
            .expect("failed to get a response"))
    }

    /// GET that is expected to fail, returning the status and error body.
    pub async fn get_error(
        &self,
        path_and_query: &str,
    ) -> (StatusCode, api::Error) {
        let response = self
            .inner
            .get(format!("{}{path_and_query}", self.base_url))
            .send()
            .await
            .expect("failed to send a request");
        let status = response.status();
        let error = response
            .json::<api::Error>()
            .await
            .expect("failed to get a response");
        (status, error)
    }

    /// POST with an arbitrary body, returning the status and raw JSON.
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
    ) -> (StatusCode, Value) {
        let response = self
            .inner
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("failed to send a request");
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .expect("failed to get a response");
        (status, body)
    }
}
