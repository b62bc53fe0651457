//! Notification message composition

use crate::types::Notification;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

/// RFC 2047 encoded-word for a UTF-8 header value
///
/// Plain ASCII is returned unchanged.
pub fn encode_header_value(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

/// Full plain-text message, CRLF line endings in the header block
pub fn compose(recipient: &str, subject: &str, notification: &Notification) -> String {
    [
        format!("To: {recipient}"),
        format!("Subject: {}", encode_header_value(subject)),
        "MIME-Version: 1.0".to_string(),
        "Content-Type: text/plain; charset=UTF-8".to_string(),
        "Content-Transfer-Encoding: 8bit".to_string(),
        String::new(),
        notification.body(),
    ]
    .join("\r\n")
}

/// Gmail `raw` field: base64url without padding
pub fn encode_raw(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}
