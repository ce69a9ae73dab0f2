pub mod cli;
pub mod commands;
pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;
