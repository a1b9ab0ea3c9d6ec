use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use derive_more::From;
use serde::Deserialize;
use time::Month;

use crate::{api, db, filter};

const FETCH_TICKETS_ERROR: &str = "Failed to fetch tickets";
const FETCH_SHOPS_ERROR: &str = "Failed to fetch shops";
const MUTATION_ERROR: &str = "Internal Server Error";
const INVALID_MONTH_ERROR: &str =
    "Invalid month. Please provide a value between 1 and 12.";

pub fn app(state: SharedAppState) -> Router {
    Router::new()
        .route("/tickets", get(get_tickets))
        .route("/tickets/by-month", get(count_by_month))
        .route("/tickets/list", get(list_tickets))
        .route("/tickets/by-shop", get(trend_by_shop))
        .route("/shops", get(list_shops))
        .route("/search/by-keyword", get(search_by_keyword))
        .route("/search/submit-form", post(add_ticket))
        .route(
            "/search/ticket/:id",
            put(edit_ticket).delete(delete_ticket),
        )
        .with_state(state)
}

async fn get_tickets(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<api::Ticket>>, GetTicketsError> {
    let tickets = state
        .store
        .get_all_tickets()
        .await?
        .into_iter()
        .map(|ticket| api::Ticket {
            id: ticket.id,
            description: ticket.description,
            status: ticket.status,
            location: ticket.location,
            request_date: ticket.request_date,
            shop: ticket.shop,
            priority: ticket.priority,
        })
        .collect();

    Ok(Json(tickets))
}

#[derive(Debug, From)]
pub enum GetTicketsError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for GetTicketsError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to fetch tickets: {e}");
                store_failure(FETCH_TICKETS_ERROR)
            }
        }
    }
}

#[derive(Deserialize)]
struct CountByMonthInput {
    month: Option<String>,
}

async fn count_by_month(
    State(state): State<SharedAppState>,
    Query(CountByMonthInput { month }): Query<CountByMonthInput>,
) -> Result<Json<api::ticket::StatusCounts>, CountByMonthError> {
    use CountByMonthError as E;

    let month = parse_month(month.as_deref()).ok_or(E::InvalidMonth)?;

    let tickets = state.store.get_all_tickets().await?;
    let counts = filter::status_counts_for_month(&tickets, month);

    Ok(Json(api::ticket::StatusCounts {
        open: counts.open,
        wip: counts.wip,
        completed: counts.completed,
        assigned: counts.assigned,
        cancelled: counts.cancelled,
    }))
}

#[derive(Debug, From)]
pub enum CountByMonthError {
    #[from]
    DbError(db::Error),
    InvalidMonth,
}

impl IntoResponse for CountByMonthError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to fetch tickets: {e}");
                store_failure(FETCH_TICKETS_ERROR)
            }
            Self::InvalidMonth => bad_request(INVALID_MONTH_ERROR),
        }
    }
}

#[derive(Deserialize)]
struct ListTicketsInput {
    month: Option<String>,
    status: Option<String>,
    page: Option<String>,
    size: Option<String>,
}

async fn list_tickets(
    State(state): State<SharedAppState>,
    Query(ListTicketsInput {
        month,
        status,
        page,
        size,
    }): Query<ListTicketsInput>,
) -> Result<Json<api::ticket::List>, ListTicketsError> {
    use ListTicketsError as E;

    let month = parse_month(month.as_deref()).ok_or(E::InvalidMonth)?;
    let status = status
        .as_deref()
        .and_then(|raw| raw.parse::<db::ticket::Status>().ok())
        .ok_or(E::InvalidStatus)?;
    let page = match page.as_deref() {
        Some(raw) => parse_count(raw).ok_or(E::InvalidPage)?,
        None => 1,
    };
    let size = match size.as_deref() {
        Some(raw) => parse_count(raw).ok_or(E::InvalidSize)?,
        None => filter::DEFAULT_PAGE_SIZE,
    };

    let tickets = state.store.get_all_tickets().await?;
    let page =
        filter::page_by_month_and_status(tickets, month, status, page, size);

    Ok(Json(api::ticket::List {
        tickets: page
            .tickets
            .into_iter()
            .map(|ticket| api::Ticket {
                id: ticket.id,
                description: ticket.description,
                status: ticket.status,
                location: ticket.location,
                request_date: ticket.request_date,
                shop: ticket.shop,
                priority: ticket.priority,
            })
            .collect(),
        total_pages: page.total_pages,
    }))
}

#[derive(Debug, From)]
pub enum ListTicketsError {
    #[from]
    DbError(db::Error),
    InvalidMonth,
    InvalidStatus,
    InvalidPage,
    InvalidSize,
}

impl IntoResponse for ListTicketsError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to fetch tickets: {e}");
                store_failure(FETCH_TICKETS_ERROR)
            }
            Self::InvalidMonth => bad_request(INVALID_MONTH_ERROR),
            Self::InvalidStatus => {
                bad_request("Please provide a valid status.")
            }
            Self::InvalidPage => {
                bad_request("Invalid page. Please provide a positive number.")
            }
            Self::InvalidSize => {
                bad_request("Invalid size. Please provide a positive number.")
            }
        }
    }
}

#[derive(Deserialize)]
struct TrendByShopInput {
    shop: Option<String>,
}

async fn trend_by_shop(
    State(state): State<SharedAppState>,
    Query(TrendByShopInput { shop }): Query<TrendByShopInput>,
) -> Result<Json<api::ticket::Trend>, TrendByShopError> {
    use TrendByShopError as E;

    let shop = shop
        .filter(|shop| !shop.trim().is_empty())
        .ok_or(E::MissingShop)?;

    let tickets = state.store.get_all_tickets().await?;
    let data = filter::monthly_counts_for_shop(&tickets, &shop);

    Ok(Json(api::ticket::Trend {
        labels: filter::MONTH_LABELS.map(str::to_owned),
        data,
    }))
}

#[derive(Debug, From)]
pub enum TrendByShopError {
    #[from]
    DbError(db::Error),
    MissingShop,
}

impl IntoResponse for TrendByShopError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to fetch tickets: {e}");
                store_failure(FETCH_TICKETS_ERROR)
            }
            Self::MissingShop => bad_request("Please provide a valid shop."),
        }
    }
}

async fn list_shops(
    State(state): State<SharedAppState>,
) -> Result<Json<Vec<api::Shop>>, ListShopsError> {
    let shops = state.store.get_shop_names().await?;

    Ok(Json(
        shops.into_iter().map(|shop| api::Shop { shop }).collect(),
    ))
}

#[derive(Debug, From)]
pub enum ListShopsError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for ListShopsError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to fetch shops: {e}");
                store_failure(FETCH_SHOPS_ERROR)
            }
        }
    }
}

#[derive(Deserialize)]
struct SearchByKeywordInput {
    keyword: Option<String>,
}

async fn search_by_keyword(
    State(state): State<SharedAppState>,
    Query(SearchByKeywordInput { keyword }): Query<SearchByKeywordInput>,
) -> Result<Json<Vec<api::Ticket>>, SearchByKeywordError> {
    use SearchByKeywordError as E;

    let keyword = keyword
        .filter(|keyword| !keyword.trim().is_empty())
        .ok_or(E::MissingKeyword)?;

    let tickets = state.store.get_all_tickets().await?;
    let tickets = filter::search_by_keyword(tickets, &keyword)
        .into_iter()
        .map(|ticket| api::Ticket {
            id: ticket.id,
            description: ticket.description,
            status: ticket.status,
            location: ticket.location,
            request_date: ticket.request_date,
            shop: ticket.shop,
            priority: ticket.priority,
        })
        .collect();

    Ok(Json(tickets))
}

#[derive(Debug, From)]
pub enum SearchByKeywordError {
    #[from]
    DbError(db::Error),
    MissingKeyword,
}

impl IntoResponse for SearchByKeywordError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to fetch tickets: {e}");
                store_failure(FETCH_TICKETS_ERROR)
            }
            Self::MissingKeyword => {
                bad_request("Please provide a valid keyword.")
            }
        }
    }
}

async fn add_ticket(
    State(state): State<SharedAppState>,
    Json(ticket): Json<api::Ticket>,
) -> Result<Json<api::ticket::Created>, AddTicketError> {
    let ticket = db::Ticket {
        id: ticket.id,
        description: ticket.description,
        status: ticket.status,
        location: ticket.location,
        request_date: ticket.request_date,
        shop: ticket.shop,
        priority: ticket.priority,
    };

    state.store.insert_ticket(&ticket).await?;

    Ok(Json(api::ticket::Created {
        message: "Ticket created successfully".to_owned(),
        data: api::Ticket {
            id: ticket.id,
            description: ticket.description,
            status: ticket.status,
            location: ticket.location,
            request_date: ticket.request_date,
            shop: ticket.shop,
            priority: ticket.priority,
        },
    }))
}

#[derive(Debug, From)]
pub enum AddTicketError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for AddTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to create ticket: {e}");
                store_failure(MUTATION_ERROR)
            }
        }
    }
}

async fn edit_ticket(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
    Json(ticket): Json<api::Ticket>,
) -> Result<Json<api::Ticket>, EditTicketError> {
    // The path names the row; an id in the body is ignored.
    let ticket = db::Ticket {
        id,
        description: ticket.description,
        status: ticket.status,
        location: ticket.location,
        request_date: ticket.request_date,
        shop: ticket.shop,
        priority: ticket.priority,
    };

    state.store.update_ticket(&ticket).await?;

    Ok(Json(api::Ticket {
        id: ticket.id,
        description: ticket.description,
        status: ticket.status,
        location: ticket.location,
        request_date: ticket.request_date,
        shop: ticket.shop,
        priority: ticket.priority,
    }))
}

#[derive(Debug, From)]
pub enum EditTicketError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for EditTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to update ticket: {e}");
                store_failure(MUTATION_ERROR)
            }
        }
    }
}

async fn delete_ticket(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
) -> Result<Json<api::Message>, DeleteTicketError> {
    state.store.delete_ticket(&id).await?;

    Ok(Json(api::Message {
        message: "Ticket deleted successfully".to_owned(),
    }))
}

#[derive(Debug, From)]
pub enum DeleteTicketError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for DeleteTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(e) => {
                tracing::error!("failed to delete ticket: {e}");
                store_failure(MUTATION_ERROR)
            }
        }
    }
}

fn parse_month(raw: Option<&str>) -> Option<Month> {
    let number = raw?.parse::<u8>().ok()?;
    Month::try_from(number).ok()
}

fn parse_count(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|count| *count > 0)
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(api::Error {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

fn store_failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(api::Error {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    pub store: Box<dyn db::Store>,
}
