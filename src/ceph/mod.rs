pub mod client;
pub mod types;

pub use client::{CephClient, CommandRunner, ProcessRunner};
