//! LINE Messaging API channel.
//!
//! Webhook payload types and signature verification for inbound events, and the reply client
//! for outbound Flex messages.

mod inbound;
mod line;
mod signature;

pub use inbound::InboundMessage;
pub use line::{LineClient, LineError, LineEvent, LineMessage, LineSource, WebhookBody};
pub use signature::{sign, verify_signature, SIGNATURE_HEADER};
