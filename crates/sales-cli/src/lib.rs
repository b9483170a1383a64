//! Library components of the `sales-clean` command.

pub mod logging;
pub mod pipeline;
pub mod store;
