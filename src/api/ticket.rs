use serde::{Deserialize, Serialize};

pub use crate::{
    db::ticket::{Id, Kind, Priority, Status, Ticket},
    filter::Stats,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub tickets: Vec<Ticket>,
    /// Size of the whole collection, before filtering.
    pub total_count: usize,
}
