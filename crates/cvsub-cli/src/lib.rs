//! Library components of the registry submission CLI.

pub mod http;
pub mod logging;
