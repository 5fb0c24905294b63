//! Gateway: HTTP server for the LINE webhook plus health and query routes.
//!
//! Single port. The webhook answers every text message inline before responding `OK`.

mod server;

pub use server::{build_router, run_gateway, GatewayState};
