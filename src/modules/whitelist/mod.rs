pub mod commands;
pub mod request;

pub use commands::whitelist;
