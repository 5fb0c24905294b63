//! Reply cards: the Flex bubble every answer uses, and the mapping from pipeline outcome to
//! user-facing text.

use crate::air_quality::{AirQualityError, AirQualityReading};
use serde::Serialize;

pub const NO_REGION_TITLE: &str = "查無地區";
pub const NO_REGION_BODY: &str = "請重新輸入地區名稱。";
pub const NO_REGION_ALT: &str = "請輸入地區";
pub const NO_DATA_BODY: &str = "查無空氣品質資料";
pub const NO_DATA_ALT: &str = "查無資料";

/// Card title for a region answer.
pub fn region_title(region: &str) -> String {
    format!("{} 空氣品質", region)
}

/// Title and body of a reply card, before layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCard {
    pub title: String,
    pub body: String,
}

impl ReplyCard {
    /// Region card: title is "<region> 空氣品質"; body may be a reading or an error message.
    pub fn for_region(region: &str, content: impl Into<String>) -> Self {
        Self {
            title: region_title(region),
            body: content.into(),
        }
    }

    pub fn region_not_found() -> Self {
        Self {
            title: NO_REGION_TITLE.to_string(),
            body: NO_REGION_BODY.to_string(),
        }
    }

    /// Lay the card out as a Flex bubble: hero image, bold title, body text.
    pub fn to_bubble(&self, hero_image_url: &str) -> FlexBubble {
        FlexBubble {
            typ: "bubble",
            hero: FlexImage {
                typ: "image",
                url: hero_image_url.to_string(),
                size: "full",
                aspect_ratio: "20:13",
                aspect_mode: "cover",
            },
            body: FlexBox {
                typ: "box",
                layout: "vertical",
                contents: vec![
                    FlexText {
                        typ: "text",
                        text: self.title.clone(),
                        weight: Some("bold"),
                        size: "xl",
                        margin: None,
                    },
                    FlexText {
                        typ: "text",
                        text: self.body.clone(),
                        weight: None,
                        size: "md",
                        margin: Some("md"),
                    },
                ],
            },
        }
    }
}

/// Flex Message bubble container.
#[derive(Debug, Clone, Serialize)]
pub struct FlexBubble {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub hero: FlexImage,
    pub body: FlexBox,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexImage {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub url: String,
    pub size: &'static str,
    pub aspect_ratio: &'static str,
    pub aspect_mode: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexBox {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub layout: &'static str,
    pub contents: Vec<FlexText>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexText {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<&'static str>,
    pub size: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
}

/// A reply ready to send: notification alt text plus card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    pub alt_text: String,
    pub card: ReplyCard,
}

/// What the pipeline found for one message.
#[derive(Debug)]
pub enum Outcome {
    RegionNotFound,
    Report {
        region: String,
        reading: AirQualityReading,
    },
    NoData {
        region: String,
        error: AirQualityError,
    },
}

impl Outcome {
    /// Every air-quality failure kind becomes the same "no data" reply; the cause is only logged.
    pub fn into_reply(self) -> ReplyMessage {
        match self {
            Outcome::RegionNotFound => ReplyMessage {
                alt_text: NO_REGION_ALT.to_string(),
                card: ReplyCard::region_not_found(),
            },
            Outcome::Report { region, reading } => ReplyMessage {
                alt_text: region_title(&region),
                card: ReplyCard::for_region(&region, reading.display()),
            },
            Outcome::NoData { region, error } => {
                log::debug!("air quality for {} unavailable: {}", region, error);
                ReplyMessage {
                    alt_text: NO_DATA_ALT.to_string(),
                    card: ReplyCard::for_region(&region, NO_DATA_BODY),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bubble_layout() {
        let card = ReplyCard::for_region("台中", "PM2.5：35\n狀態：良好");
        let v = serde_json::to_value(card.to_bubble("https://img.example/a.png")).unwrap();
        assert_eq!(
            v,
            json!({
                "type": "bubble",
                "hero": {
                    "type": "image",
                    "url": "https://img.example/a.png",
                    "size": "full",
                    "aspectRatio": "20:13",
                    "aspectMode": "cover"
                },
                "body": {
                    "type": "box",
                    "layout": "vertical",
                    "contents": [
                        {"type": "text", "text": "台中 空氣品質", "weight": "bold", "size": "xl"},
                        {"type": "text", "text": "PM2.5：35\n狀態：良好", "size": "md", "margin": "md"}
                    ]
                }
            })
        );
    }

    #[test]
    fn any_strings_are_accepted() {
        let card = ReplyCard::for_region("", "");
        assert_eq!(card.title, " 空氣品質");
        let v = serde_json::to_value(card.to_bubble("")).unwrap();
        assert_eq!(v["body"]["contents"][1]["text"], "");
    }

    #[test]
    fn region_not_found_reply() {
        let r = Outcome::RegionNotFound.into_reply();
        assert_eq!(r.alt_text, "請輸入地區");
        assert_eq!(r.card.title, "查無地區");
        assert_eq!(r.card.body, "請重新輸入地區名稱。");
    }

    #[test]
    fn report_reply() {
        let reading = crate::air_quality::parse_reading(r#"{"pm25":35,"status":"良好"}"#.as_bytes()).unwrap();
        let r = Outcome::Report {
            region: "台中".to_string(),
            reading,
        }
        .into_reply();
        assert_eq!(r.alt_text, "台中 空氣品質");
        assert_eq!(r.card.title, "台中 空氣品質");
        assert_eq!(r.card.body, "PM2.5：35\n狀態：良好");
    }

    #[test]
    fn every_failure_kind_reads_the_same() {
        let errors = vec![
            AirQualityError::Status(reqwest::StatusCode::NOT_FOUND),
            AirQualityError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            AirQualityError::Decode("missing field `status`".to_string()),
        ];
        for error in errors {
            let r = Outcome::NoData {
                region: "東京".to_string(),
                error,
            }
            .into_reply();
            assert_eq!(r.alt_text, "查無資料");
            assert_eq!(r.card.title, "東京 空氣品質");
            assert_eq!(r.card.body, "查無空氣品質資料");
        }
    }
}
