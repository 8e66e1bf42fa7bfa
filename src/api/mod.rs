pub mod ticket;
pub mod view;

pub use self::ticket::Ticket;
