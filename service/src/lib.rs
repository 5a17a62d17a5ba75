//! Infrastructure concerns shared by every crate in the workspace:
//! configuration loading and terminal logging.

pub mod config;
pub mod logging;
