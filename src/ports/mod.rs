//! Traits at the I/O boundary. Domain code depends on these, adapters implement them.

pub mod config_port;
pub mod data_port;
pub mod report_port;
