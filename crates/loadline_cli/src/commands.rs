pub mod config;
pub mod flights;
pub mod replay;
