//! Flash message utilities for server-to-client communication.
//!
//! Flash messages are short-lived messages stored in a cookie. They survive
//! one redirect, are shown on the next HTML page and then cleared.

use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash_message";

/// Flash message structure stored in cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashMessage {
    /// Message type ("error", "success" or "info")
    #[serde(rename = "type")]
    pub message_type: String,
    pub message: String,
    /// Whether the message should auto-dismiss after a few seconds
    #[serde(default)]
    pub auto_dismiss: bool,
}

impl FlashMessage {
    /// Create an error flash message that requires manual dismissal.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message_type: "error".to_string(),
            message: message.into(),
            auto_dismiss: false,
        }
    }

    /// Create a success flash message that auto-dismisses.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message_type: "success".to_string(),
            message: message.into(),
            auto_dismiss: true,
        }
    }

    /// A notice about how the request was interpreted, shown inline.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message_type: "warning".to_string(),
            message: message.into(),
            auto_dismiss: false,
        }
    }

    /// Serialize to JSON for cookie storage.
    pub fn to_cookie_value(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Build a Set-Cookie header value for the flash message.
    ///
    /// Cookie properties:
    /// - Path: / (accessible from any page)
    /// - SameSite: Lax (sent on navigation, not cross-site requests)
    /// - Max-Age: 60 (expires after 60 seconds as a safety net)
    pub fn to_set_cookie_header(&self) -> String {
        let cookie_value = self.to_cookie_value();
        let encoded = urlencoding::encode(&cookie_value);
        format!("{FLASH_COOKIE}={encoded}; Path=/; SameSite=Lax; Max-Age=60")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFlash {
    One(FlashMessage),
    Many(Vec<FlashMessage>),
}

/// Decodes a flash cookie value holding one message or a list of them.
pub fn parse_flash_cookie(value: &str) -> Vec<FlashMessage> {
    let Ok(decoded) = urlencoding::decode(value) else {
        return Vec::new();
    };
    match serde_json::from_str::<StoredFlash>(&decoded) {
        Ok(StoredFlash::One(message)) => vec![message],
        Ok(StoredFlash::Many(messages)) => messages,
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring unreadable flash cookie");
            Vec::new()
        }
    }
}

/// Reads pending flash messages from the request cookies.
pub fn read_flash(jar: &CookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| parse_flash_cookie(cookie.value()))
        .unwrap_or_default()
}

/// Removes the flash cookie once its messages have been shown.
pub fn clear_flash(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(FLASH_COOKIE).path("/"))
}

/// Create a redirect response with a flash message cookie.
pub fn redirect_with_flash(url: &str, flash: FlashMessage) -> Response {
    let cookie_header = flash.to_set_cookie_header();

    ([(SET_COOKIE, cookie_header)], Redirect::to(url)).into_response()
}
