// nc_loader/src/lib.rs
// Public API for the nc_loader module: delimited text to document collections.

pub mod batch;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod mongo;
pub mod projection;
pub mod registry;
pub mod retry;
pub mod sink;
pub mod source;
pub mod transform;

pub const DEFAULT_DATABASE_NAME: &str = "nc_loader";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
