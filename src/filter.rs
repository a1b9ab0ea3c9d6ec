use time::Month;

use crate::db::ticket::{Status, Ticket};

/// Page size applied when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Chart labels paired index-for-index with [`monthly_counts_for_shop`].
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct",
    "Nov", "Dec",
];

/// Tickets whose description contains `keyword`, case-insensitively.
pub fn search_by_keyword(
    tickets: Vec<Ticket>,
    keyword: &str,
) -> Vec<Ticket> {
    let keyword = keyword.to_lowercase();
    tickets
        .into_iter()
        .filter(|t| t.description.to_lowercase().contains(&keyword))
        .collect()
}

#[derive(Clone, Debug)]
pub struct Page {
    pub tickets: Vec<Ticket>,
    pub total_pages: usize,
}

/// Tickets filed in `month` with the given status, cut down to the
/// 1-based `page` of `size` rows each. `page` and `size` are expected
/// to be nonzero.
pub fn page_by_month_and_status(
    tickets: Vec<Ticket>,
    month: Month,
    status: Status,
    page: usize,
    size: usize,
) -> Page {
    let matched = tickets
        .into_iter()
        .filter(|t| t.request_date.month() == month && t.status == status)
        .collect::<Vec<_>>();

    let total_pages = matched.len().div_ceil(size);
    let tickets = matched
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(size))
        .take(size)
        .collect();

    Page {
        tickets,
        total_pages,
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatusCounts {
    pub open: usize,
    pub wip: usize,
    pub completed: usize,
    pub assigned: usize,
    pub cancelled: usize,
}

pub fn status_counts_for_month(
    tickets: &[Ticket],
    month: Month,
) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for ticket in tickets {
        if ticket.request_date.month() != month {
            continue;
        }
        match ticket.status {
            Status::Open => counts.open += 1,
            Status::WIP => counts.wip += 1,
            Status::Completed => counts.completed += 1,
            Status::Assigned => counts.assigned += 1,
            Status::Cancelled => counts.cancelled += 1,
        }
    }
    counts
}

/// Tickets with the exact `shop` value bucketed by calendar month,
/// January first.
pub fn monthly_counts_for_shop(
    tickets: &[Ticket],
    shop: &str,
) -> [usize; 12] {
    let mut counts = [0; 12];
    for ticket in tickets {
        if ticket.shop == shop {
            counts[ticket.request_date.month() as usize - 1] += 1;
        }
    }
    counts
}
