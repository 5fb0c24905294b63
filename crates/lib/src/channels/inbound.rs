//! Inbound text message extracted from a webhook event.

/// One user text message plus the one-time token that addresses its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub reply_token: String,
    /// Sender user id, when LINE includes it. Logged only.
    pub user_id: Option<String>,
}
