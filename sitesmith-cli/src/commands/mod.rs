//! CLI command implementations

pub mod config;
pub mod git;
pub mod session;
pub mod write;

pub use git::GitArgs;
pub use write::WriteArgs;

/// Print a response record and report whether it succeeded
pub fn print_record(record: &serde_json::Value) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(record["success"].as_bool().unwrap_or(false))
}
