pub mod badge;
pub mod config;
pub mod dates;
