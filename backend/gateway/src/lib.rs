//! Moodline service object and HTTP server.
//!
//! `MoodService` is the single entry point wiring the stores, the message
//! sink, the event router and the broadcast dispatcher together; the server
//! exposes it over the LINE webhook, the chart endpoint and a small JSON API.

pub mod server;
pub mod service;

pub use server::{build_router, serve, start_server};
pub use service::{MoodService, ServiceOptions};
