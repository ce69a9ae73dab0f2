mod models;

pub use models::{AiConfig, Settings};
