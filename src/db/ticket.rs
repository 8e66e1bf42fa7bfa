use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{Client, Error};

/// Storage key of the ticket collection.
pub const KEY: &str = "it_tickets_data";

pub const COMPANIES: [&str; 4] = [
    "PT Padma Jarka Abadi",
    "PT Sembilan Matahari Sakti",
    "PT Semesta Mataram Sakti",
    "PT Sumber Santoso Abadi",
];

pub const TECHNICIANS: [&str; 5] = [
    "GILANG PERMANA",
    "FERI SAT QOMARUDDIN",
    "ARDIAN BEKTI PRASETYO",
    "PAUPAULINA ALDRIANTO",
    "NURUL INAYAH",
];

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub company: String,
    /// Person in charge: the technician assigned to the ticket.
    pub pic: String,
    pub issue: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Ticket {
    /// High priority and not finished yet.
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::High && self.status != Status::Done
    }
}

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Time-ordered identifier derived from the current clock.
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Nobody has started on it.
    #[display("PENDING")]
    Pending,

    /// A technician is working on it.
    #[display("PROCESS")]
    Process,

    #[display("DONE")]
    Done,
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[display("NORMAL")]
    Normal,
    #[display("HIGH")]
    High,
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    /// Hardware.
    #[display("HW")]
    Hw,
    /// Software.
    #[display("SW")]
    Sw,
}

/// Example tickets written on first access to an empty store.
pub fn seed(today: Date) -> Vec<Ticket> {
    vec![
        Ticket {
            id: Id::from("1"),
            date: today,
            company: COMPANIES[0].to_owned(),
            pic: TECHNICIANS[0].to_owned(),
            issue: "PC Admin Gudang Mati Total (PSU)".to_owned(),
            kind: Kind::Hw,
            status: Status::Pending,
            priority: Priority::High,
            photo_url: Some(
                "https://picsum.photos/200/200?random=1".to_owned(),
            ),
            notes: None,
        },
        Ticket {
            id: Id::from("2"),
            date: today - Duration::days(1),
            company: COMPANIES[1].to_owned(),
            pic: TECHNICIANS[1].to_owned(),
            issue: "Install Ulang Accurate Server".to_owned(),
            kind: Kind::Sw,
            status: Status::Process,
            priority: Priority::Normal,
            photo_url: Some(
                "https://picsum.photos/200/200?random=2".to_owned(),
            ),
            notes: None,
        },
        Ticket {
            id: Id::from("3"),
            date: today - Duration::days(2),
            company: COMPANIES[2].to_owned(),
            pic: TECHNICIANS[2].to_owned(),
            issue: "Printer Epson L3110 Paper Jam".to_owned(),
            kind: Kind::Hw,
            status: Status::Done,
            priority: Priority::Normal,
            photo_url: Some(
                "https://picsum.photos/200/200?random=3".to_owned(),
            ),
            notes: None,
        },
    ]
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

impl Client {
    /// Returns every stored ticket, newest insertions first.
    ///
    /// A missing or unreadable collection is replaced by the [`seed`]
    /// tickets, which are persisted before being returned.
    pub async fn get_tickets(&self) -> Result<Vec<Ticket>, Error> {
        if let Some(tickets) = self.read_tickets().await? {
            return Ok(tickets);
        }
        let _guard = self.write_lock.lock().await;
        self.read_or_seed_tickets().await
    }

    pub async fn get_ticket_by_id(
        &self,
        id: &Id,
    ) -> Result<Option<Ticket>, Error> {
        Ok(self
            .get_tickets()
            .await?
            .into_iter()
            .find(|ticket| &ticket.id == id))
    }

    /// Replaces the ticket with the same id in place, or puts a new one
    /// at the front of the collection.
    pub async fn write_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        let mut tickets = self.read_or_seed_tickets().await?;
        match tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(existing) => *existing = ticket.clone(),
            None => tickets.insert(0, ticket.clone()),
        }
        self.store_tickets(&tickets).await
    }

    /// Replaces the ticket with the same id in place. Returns `false` and
    /// leaves the collection untouched when no such ticket is stored.
    pub async fn update_ticket(&self, ticket: &Ticket) -> Result<bool, Error> {
        let _guard = self.write_lock.lock().await;

        let mut tickets = self.read_or_seed_tickets().await?;
        let Some(existing) = tickets.iter_mut().find(|t| t.id == ticket.id)
        else {
            return Ok(false);
        };
        *existing = ticket.clone();
        self.store_tickets(&tickets).await?;
        Ok(true)
    }

    /// Removing an unknown id is not an error.
    pub async fn delete_ticket(&self, id: &Id) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        let mut tickets = self.read_or_seed_tickets().await?;
        tickets.retain(|t| &t.id != id);
        self.store_tickets(&tickets).await
    }

    /// Must be called with `write_lock` held.
    async fn read_or_seed_tickets(&self) -> Result<Vec<Ticket>, Error> {
        if let Some(tickets) = self.read_tickets().await? {
            return Ok(tickets);
        }
        let tickets = seed(today());
        self.store_tickets(&tickets).await?;
        info!(count = tickets.len(), "seeded ticket store");
        Ok(tickets)
    }

    async fn read_tickets(&self) -> Result<Option<Vec<Ticket>>, Error> {
        let Some(raw) = self.storage.read(KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&raw) {
            Ok(tickets) => Ok(Some(tickets)),
            Err(e) => {
                warn!("stored ticket collection is corrupt, reseeding: {e}");
                Ok(None)
            }
        }
    }

    async fn store_tickets(&self, tickets: &[Ticket]) -> Result<(), Error> {
        let raw = serde_json::to_vec(tickets)?;
        self.storage.write(KEY, &raw).await.map_err(Error::from)
    }
}
