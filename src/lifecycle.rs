//! Turning form input into stored tickets.

use derive_more::{Display, From};
use serde::Deserialize;
use time::{macros::format_description, Date};
use tracing::info;

use crate::db::{
    self,
    ticket::{self, Id, Kind, Priority, Status, Ticket},
};

/// Form contents before validation. Every field may be missing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Draft {
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    pub company: Option<String>,
    pub pic: Option<String>,
    pub issue: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<Kind>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

impl Draft {
    /// Empty form for a new ticket dated `today`.
    pub fn new(today: Date) -> Self {
        Self {
            date: Some(today.to_string()),
            kind: Some(Kind::Hw),
            status: Some(Status::Pending),
            priority: Some(Priority::Normal),
            ..Self::default()
        }
    }

    /// Fields set in `patch` win over the ones in `self`.
    pub fn merge(self, patch: Draft) -> Self {
        Self {
            date: patch.date.or(self.date),
            company: patch.company.or(self.company),
            pic: patch.pic.or(self.pic),
            issue: patch.issue.or(self.issue),
            kind: patch.kind.or(self.kind),
            status: patch.status.or(self.status),
            priority: patch.priority.or(self.priority),
            photo_url: patch.photo_url.or(self.photo_url),
            notes: patch.notes.or(self.notes),
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    pub fn finalize(self, id: Id) -> Result<Ticket, ValidationError> {
        use ValidationError as E;

        let (Some(date), Some(company), Some(pic), Some(issue)) = (
            non_blank(self.date),
            non_blank(self.company),
            non_blank(self.pic),
            non_blank(self.issue),
        ) else {
            return Err(E::MissingFields);
        };

        let format = format_description!("[year]-[month]-[day]");
        let date =
            Date::parse(&date, format).map_err(|_| E::InvalidDate(date))?;
        if !ticket::COMPANIES.contains(&company.as_str()) {
            return Err(E::UnknownCompany(company));
        }
        if !ticket::TECHNICIANS.contains(&pic.as_str()) {
            return Err(E::UnknownPic(pic));
        }

        Ok(Ticket {
            id,
            date,
            company,
            pic,
            issue,
            kind: self.kind.unwrap_or(Kind::Hw),
            status: self.status.unwrap_or(Status::Pending),
            priority: self.priority.unwrap_or(Priority::Normal),
            photo_url: self.photo_url.filter(|url| !url.is_empty()),
            notes: self.notes.filter(|notes| !notes.is_empty()),
        })
    }
}

impl From<&Ticket> for Draft {
    fn from(ticket: &Ticket) -> Self {
        Self {
            date: Some(ticket.date.to_string()),
            company: Some(ticket.company.clone()),
            pic: Some(ticket.pic.clone()),
            issue: Some(ticket.issue.clone()),
            kind: Some(ticket.kind),
            status: Some(ticket.status),
            priority: Some(ticket.priority),
            photo_url: ticket.photo_url.clone(),
            notes: ticket.notes.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ValidationError {
    #[display("date, company, PIC and issue are required")]
    MissingFields,
    #[display("`{_0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[display("unknown company `{_0}`")]
    UnknownCompany(String),
    #[display("unknown technician `{_0}`")]
    UnknownPic(String),
}

impl std::error::Error for ValidationError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Saved(Ticket),
    /// The user declined a confirmation prompt; nothing was changed.
    Declined,
}

#[derive(Debug, From)]
pub enum SubmitError {
    #[from]
    Validation(ValidationError),
    #[from]
    DbError(db::Error),
    /// The edited ticket was deleted before the edit was saved.
    TicketNotFound,
}

/// Validates `draft` and stores the result.
///
/// `editing` is the ticket the form was opened for, if any. An edit only
/// replaces a ticket that is still stored. A new ticket without a photo is
/// only saved when `confirm_without_photo` agrees.
pub async fn submit(
    db_client: &db::Client,
    draft: Draft,
    editing: Option<&Ticket>,
    confirm_without_photo: impl FnOnce() -> bool,
) -> Result<Outcome, SubmitError> {
    let needs_confirmation = editing.is_none() && !draft.has_photo();
    let id = editing.map_or_else(Id::new, |t| t.id.clone());
    let ticket = draft.finalize(id)?;

    if needs_confirmation && !confirm_without_photo() {
        return Ok(Outcome::Declined);
    }

    if editing.is_some() {
        if !db_client.update_ticket(&ticket).await? {
            return Err(SubmitError::TicketNotFound);
        }
    } else {
        db_client.write_ticket(&ticket).await?;
    }
    info!(id = %ticket.id, created = editing.is_none(), "saved ticket");

    Ok(Outcome::Saved(ticket))
}

/// Deletes the ticket if `confirm` agrees. `false` means it was declined.
pub async fn delete(
    db_client: &db::Client,
    id: &Id,
    confirm: impl FnOnce() -> bool,
) -> Result<bool, db::Error> {
    if !confirm() {
        return Ok(false);
    }
    db_client.delete_ticket(id).await?;
    info!(%id, "deleted ticket");
    Ok(true)
}
