pub mod catalog;
pub mod config;
pub mod matcher;
pub mod pipeline;
pub mod session;
