pub mod api;
pub mod config;
pub mod db;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod summary;
pub mod view;

pub use self::config::Config;
