//! LINE webhook payload types and the reply API client.

use crate::channels::inbound::InboundMessage;
use crate::reply::FlexBubble;
use serde::{Deserialize, Serialize};

const LINE_API_BASE: &str = "https://api.line.me";

/// Webhook POST body: `{ "destination", "events": [...] }`.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<LineEvent>,
}

/// One webhook event. Only text message events are acted on; everything else is kept loose so
/// new event types do not fail parsing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub message: Option<LineMessage>,
    #[serde(default)]
    pub source: Option<LineSource>,
    #[serde(default)]
    pub reply_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl LineEvent {
    /// Text message with a reply token, or None for anything the bot does not answer.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        if self.typ != "message" {
            return None;
        }
        let message = self.message?;
        if message.typ != "text" {
            return None;
        }
        let text = message.text?;
        let reply_token = self.reply_token.filter(|t| !t.is_empty())?;
        Some(InboundMessage {
            text,
            reply_token,
            user_id: self.source.and_then(|s| s.user_id),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<FlexMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlexMessage<'a> {
    #[serde(rename = "type")]
    typ: &'static str,
    alt_text: &'a str,
    contents: &'a FlexBubble,
}

/// Client for the LINE Messaging API reply endpoint.
#[derive(Clone)]
pub struct LineClient {
    api_base: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(api_base: Option<String>, access_token: String) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| LINE_API_BASE.to_string());
        Self {
            api_base,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /v2/bot/message/reply with one Flex message.
    pub async fn reply_flex(
        &self,
        reply_token: &str,
        alt_text: &str,
        contents: &FlexBubble,
    ) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = ReplyRequest {
            reply_token,
            messages: vec![FlexMessage {
                typ: "flex",
                alt_text,
                contents,
            }],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyCard;

    const SAMPLE: &str = r#"{
        "destination": "Uxxxxxxxx",
        "events": [
            {
                "type": "message",
                "message": {"type": "text", "id": "1", "text": "查詢台中空氣品質"},
                "timestamp": 1462629479859,
                "source": {"type": "user", "userId": "U4af498"},
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "mode": "active"
            },
            {
                "type": "message",
                "message": {"type": "sticker", "id": "2", "packageId": "1", "stickerId": "1"},
                "replyToken": "t2",
                "source": {"type": "user", "userId": "U4af498"}
            },
            {"type": "follow", "replyToken": "t3", "source": {"type": "user"}},
            {"type": "unfollow", "source": {"type": "user", "userId": "U1"}}
        ]
    }"#;

    #[test]
    fn parses_events_and_keeps_only_text_messages() {
        let body: WebhookBody = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(body.destination.as_deref(), Some("Uxxxxxxxx"));
        assert_eq!(body.events.len(), 4);
        let inbound: Vec<InboundMessage> = body
            .events
            .into_iter()
            .filter_map(LineEvent::into_inbound)
            .collect();
        assert_eq!(
            inbound,
            vec![InboundMessage {
                text: "查詢台中空氣品質".to_string(),
                reply_token: "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA".to_string(),
                user_id: Some("U4af498".to_string()),
            }]
        );
    }

    #[test]
    fn text_without_reply_token_is_skipped() {
        let ev: LineEvent = serde_json::from_str(
            r#"{"type":"message","message":{"type":"text","text":"台北"},"replyToken":""}"#,
        )
        .unwrap();
        assert_eq!(ev.into_inbound(), None);
    }

    #[test]
    fn empty_events_body() {
        let body: WebhookBody = serde_json::from_str(r#"{"destination":"U","events":[]}"#).unwrap();
        assert!(body.events.is_empty());
    }

    #[test]
    fn reply_request_shape() {
        let bubble = ReplyCard::region_not_found().to_bubble("https://img.example/h.png");
        let body = ReplyRequest {
            reply_token: "tok",
            messages: vec![FlexMessage {
                typ: "flex",
                alt_text: "請輸入地區",
                contents: &bubble,
            }],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["replyToken"], "tok");
        assert_eq!(v["messages"][0]["type"], "flex");
        assert_eq!(v["messages"][0]["altText"], "請輸入地區");
        assert_eq!(v["messages"][0]["contents"]["type"], "bubble");
        assert_eq!(v["messages"][0]["contents"]["body"]["contents"][0]["text"], "查無地區");
    }
}
