#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! One-shot driver for an AI worker: build the body, send it, print or save the reply.

pub mod config;
pub mod driver;

pub use config::DriverConfig;
pub use driver::{DriverError, Outcome, build_request, handle_response, print_stream, report, run};
