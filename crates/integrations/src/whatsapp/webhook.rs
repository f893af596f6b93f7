//! Inbound webhook payloads.
//!
//! Only `entry[].changes[].value.messages[]` is read; delivery status
//! callbacks arrive on the same endpoint and carry no messages.

use ara_core::intake::{MediaRef, MessageEnvelope, MessageKind};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Top-level webhook body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    /// Always `whatsapp_business_account`.
    #[serde(default)]
    pub object: Option<String>,
    /// Batched entries.
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// One business account entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    /// Changes in this entry.
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// One change notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    /// Change payload.
    #[serde(default)]
    pub value: ChangeValue,
}

/// Change payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    /// Inbound messages, absent on status callbacks. Entries that do not
    /// parse are dropped so they cannot take their siblings down with them.
    #[serde(default, deserialize_with = "readable_messages")]
    pub messages: Vec<InboundMessage>,
}

fn readable_messages<'de, D>(deserializer: D) -> Result<Vec<InboundMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| {
            serde_json::from_value(value)
                .inspect_err(|e| warn!(error = %e, "skipping unreadable inbound message"))
                .ok()
        })
        .collect())
}

/// A single inbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Sender's phone number.
    pub from: String,
    /// Message id.
    #[serde(default)]
    pub id: Option<String>,
    /// Unix seconds, as a string.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Message type (`text`, `audio`, `image`, `sticker`...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Present on text messages.
    #[serde(default)]
    pub text: Option<TextContent>,
    /// Present on audio messages.
    #[serde(default)]
    pub audio: Option<MediaContent>,
    /// Present on image messages.
    #[serde(default)]
    pub image: Option<MediaContent>,
}

/// Text body.
#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    /// The text.
    pub body: String,
}

/// Media attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaContent {
    /// Graph API media id.
    pub id: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Content hash.
    #[serde(default)]
    pub sha256: Option<String>,
}

impl MediaContent {
    fn media_ref(&self) -> MediaRef {
        MediaRef {
            media_id: self.id.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl InboundMessage {
    /// Convert to the transport-neutral envelope.
    #[must_use]
    pub fn to_envelope(&self) -> MessageEnvelope {
        let kind = match (self.kind.as_str(), &self.text, &self.audio, &self.image) {
            ("text", Some(text), _, _) => MessageKind::Text {
                body: text.body.clone(),
            },
            ("audio", _, Some(audio), _) => MessageKind::Audio(audio.media_ref()),
            ("image", _, _, Some(image)) => MessageKind::Image(image.media_ref()),
            (other, ..) => MessageKind::Unsupported {
                kind: other.to_string(),
            },
        };

        MessageEnvelope {
            sender: self.from.clone(),
            message_id: self.id.clone(),
            kind,
        }
    }
}

impl WebhookPayload {
    /// Every message in the payload, in delivery order.
    #[must_use]
    pub fn envelopes(&self) -> Vec<MessageEnvelope> {
        self.entry
            .iter()
            .flat_map(|e| &e.changes)
            .flat_map(|c| &c.value.messages)
            .map(InboundMessage::to_envelope)
            .collect()
    }
}

/// Query string of the subscription verification handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyParams {
    /// Must be `subscribe`.
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// Must equal the configured verify token.
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// Echoed back on success.
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Returns the challenge to echo when the handshake is valid.
///
/// An empty configured token never verifies.
#[must_use]
pub fn verify_challenge<'a>(params: &'a VerifyParams, expected_token: &str) -> Option<&'a str> {
    if expected_token.is_empty() {
        return None;
    }
    match (&params.mode, &params.verify_token, &params.challenge) {
        (Some(mode), Some(token), Some(challenge))
            if mode == "subscribe" && token == expected_token =>
        {
            Some(challenge.as_str())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {"phone_number_id": "123"},
                    "messages": [
                        {"from": "5511987654321", "id": "wamid.1", "timestamp": "1700000000",
                         "type": "text", "text": {"body": "vendi 45 de cachorro-quente"}},
                        {"from": "5511987654321", "id": "wamid.2", "timestamp": "1700000001",
                         "type": "audio", "audio": {"id": "AUD1", "mime_type": "audio/ogg; codecs=opus"}},
                        {"from": "5521900000000", "id": "wamid.3", "timestamp": "1700000002",
                         "type": "image", "image": {"id": "IMG1", "mime_type": "image/jpeg", "sha256": "abc"}},
                        {"from": "5521900000000", "id": "wamid.4", "timestamp": "1700000003",
                         "type": "sticker", "sticker": {"id": "STK1"}}
                    ]
                }
            }]
        }]
    }"#;

    #[test]
    fn test_payload_to_envelopes() {
        let payload: WebhookPayload = serde_json::from_str(PAYLOAD).unwrap();
        let envelopes = payload.envelopes();
        assert_eq!(envelopes.len(), 4);

        assert_eq!(
            envelopes[0],
            MessageEnvelope {
                sender: "5511987654321".into(),
                message_id: Some("wamid.1".into()),
                kind: MessageKind::Text {
                    body: "vendi 45 de cachorro-quente".into()
                },
            }
        );
        assert_eq!(
            envelopes[1].kind,
            MessageKind::Audio(MediaRef {
                media_id: "AUD1".into(),
                mime_type: Some("audio/ogg; codecs=opus".into()),
            })
        );
        assert!(matches!(envelopes[2].kind, MessageKind::Image(ref m) if m.media_id == "IMG1"));
        assert_eq!(
            envelopes[3].kind,
            MessageKind::Unsupported {
                kind: "sticker".into()
            }
        );
    }

    #[test]
    fn test_status_callback_has_no_messages() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"object":"whatsapp_business_account","entry":[{"changes":[{"value":{"statuses":[{"id":"wamid.1","status":"read"}]}}]}]}"#,
        )
        .unwrap();
        assert!(payload.envelopes().is_empty());
    }

    #[test]
    fn test_text_type_without_body_is_unsupported() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"entry":[{"changes":[{"value":{"messages":[{"from":"1","id":"x","type":"text"}]}}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            payload.envelopes()[0].kind,
            MessageKind::Unsupported { .. }
        ));
    }

    #[test]
    fn test_unreadable_message_is_skipped_alone() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"entry":[{"changes":[{"value":{"messages":[
                {"id":"wamid.bad","type":"text","text":{"body":"sem remetente"}},
                {"from":"5511987654321","type":"text","text":{"body":"vendi 10"}},
                {"from":"5511987654321","id":"wamid.3","type":"text","text":{"body":"gastei 5"}}
            ]}}]}]}"#,
        )
        .unwrap();
        let envelopes = payload.envelopes();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].message_id, None);
        assert_eq!(envelopes[1].message_id.as_deref(), Some("wamid.3"));
    }

    #[test]
    fn test_verify_challenge() {
        let params = VerifyParams {
            mode: Some("subscribe".into()),
            verify_token: Some("s3cret".into()),
            challenge: Some("1158201444".into()),
        };
        assert_eq!(verify_challenge(&params, "s3cret"), Some("1158201444"));
        assert_eq!(verify_challenge(&params, "other"), None);
        assert_eq!(verify_challenge(&params, ""), None);

        let wrong_mode = VerifyParams {
            mode: Some("unsubscribe".into()),
            ..params
        };
        assert_eq!(verify_challenge(&wrong_mode, "s3cret"), None);
    }
}
