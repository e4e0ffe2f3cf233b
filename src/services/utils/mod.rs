//! Shared plumbing for the upstream adapters

pub mod html;
pub mod http;

pub use http::{build_client, fetch_json, fetch_text, send_checked};
