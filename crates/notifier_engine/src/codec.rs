use serde::Deserialize;

use crate::{EmailJobPayload, PushMessage};

const TYPE_SURVEY_EMAIL: &str = "survey_email";
const TYPE_MANUAL_EMAIL: &str = "manual_email";
const TYPE_NOTIFICATIONS: &str = "notifications";
const TYPE_EXPORTS: &str = "exports";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not valid json: {0}")]
    Json(String),
    #[error("missing or empty field `{field}` on `{kind}` message")]
    MissingField { kind: String, field: &'static str },
}

/// Raw wire shape. Every field except the discriminator is optional here;
/// which ones are required depends on the kind.
#[derive(Debug, Deserialize)]
struct RawPushMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "templateId", default)]
    template_id: Option<String>,
    #[serde(rename = "emailHistoryId", default)]
    email_history_id: Option<String>,
    #[serde(rename = "usersLength", default)]
    users_length: Option<u64>,
    #[serde(rename = "exportHistoryId", default)]
    export_history_id: Option<String>,
}

/// Decode one raw push payload into a typed message.
///
/// Unknown `type` values decode as [`PushMessage::Heartbeat`]: the stream
/// carries discriminators this client has no behavior for (progress pings,
/// the historically misspelled `hearthbeat` keep-alive), and those must be
/// ignored rather than rejected. Malformed payloads and known kinds with
/// missing identifiers are errors; callers log and drop them.
pub fn decode_push(raw: &str) -> Result<PushMessage, DecodeError> {
    let raw: RawPushMessage =
        serde_json::from_str(raw).map_err(|err| DecodeError::Json(err.to_string()))?;

    let message = match raw.kind.as_str() {
        TYPE_SURVEY_EMAIL => PushMessage::SurveyEmailComplete(email_payload(&raw)?),
        TYPE_MANUAL_EMAIL => PushMessage::ManualEmailComplete(email_payload(&raw)?),
        TYPE_NOTIFICATIONS => PushMessage::BulkNotificationComplete(email_payload(&raw)?),
        TYPE_EXPORTS => PushMessage::ExportComplete {
            export_history_id: required(&raw, raw.export_history_id.as_deref(), "exportHistoryId")?,
        },
        _ => PushMessage::Heartbeat,
    };
    Ok(message)
}

fn email_payload(raw: &RawPushMessage) -> Result<EmailJobPayload, DecodeError> {
    Ok(EmailJobPayload {
        template_id: required(raw, raw.template_id.as_deref(), "templateId")?,
        email_history_id: required(raw, raw.email_history_id.as_deref(), "emailHistoryId")?,
        users_length: raw.users_length.unwrap_or(0),
    })
}

fn required(
    raw: &RawPushMessage,
    value: Option<&str>,
    field: &'static str,
) -> Result<String, DecodeError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DecodeError::MissingField {
            kind: raw.kind.clone(),
            field,
        }),
    }
}
