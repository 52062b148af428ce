//! Provider Layer
//!
//! The items provider and the transport seam it dispatches through.

mod http;
mod items_provider;

pub use http::*;
pub use items_provider::*;
