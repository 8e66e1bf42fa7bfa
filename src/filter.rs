//! Derives the displayed ticket list from the full collection.

use std::{cmp::Reverse, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::db::ticket::{Status, Ticket};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(try_from = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => s == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "PENDING" => Ok(Self::Only(Status::Pending)),
            "PROCESS" => Ok(Self::Only(Status::Process)),
            "DONE" => Ok(Self::Only(Status::Done)),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug)]
pub struct UnknownStatus(String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status filter `{}`", self.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Query {
    /// Case-insensitive substring of `issue`, `company` or `pic`.
    pub search: String,
    pub status: StatusFilter,
}

impl Query {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let needle = self.search.to_lowercase();
        let found = [&ticket.issue, &ticket.company, &ticket.pic]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle));
        found && self.status.matches(ticket.status)
    }
}

/// Matching tickets, urgent ones first, then newest date first.
pub fn apply(tickets: &[Ticket], query: &Query) -> Vec<Ticket> {
    let mut matched = tickets
        .iter()
        .filter(|t| query.matches(t))
        .cloned()
        .collect::<Vec<_>>();
    sort(&mut matched);
    matched
}

/// Stable, so tickets with equal keys keep their stored order.
pub fn sort(tickets: &mut [Ticket]) {
    tickets.sort_by_key(|t| (Reverse(t.is_urgent()), Reverse(t.date)));
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub process: usize,
    pub done: usize,
}

impl Stats {
    pub fn of(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(
            Self {
                total: tickets.len(),
                ..Self::default()
            },
            |mut stats, ticket| {
                match ticket.status {
                    Status::Pending => stats.pending += 1,
                    Status::Process => stats.process += 1,
                    Status::Done => stats.done += 1,
                }
                stats
            },
        )
    }
}
