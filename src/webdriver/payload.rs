//! Request bodies and response parsing for the `WebDriver` wire format.
//!
//! Kept free of I/O so the exact JSON shapes can be checked directly.

use serde_json::{Value, json};

/// Key under which W3C drivers return an element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// `WebDriver` code point for the Enter key.
pub const ENTER_KEY: char = '\u{E007}';

/// Chrome flags for the puzzle browser: visible window, no extensions, muted.
const CHROME_ARGS: [&str; 4] = [
    "--disable-features=PaintHolding",
    "--disable-extensions",
    "--mute-audio",
    "--remote-allow-origins=*",
];

/// Capabilities for a new session.
///
/// No headless flag: the operator watches and fixes the window.
/// `detach` keeps Chrome open after the driver connection goes away.
pub fn new_session() -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": CHROME_ARGS,
                    "detach": true,
                },
            },
        },
    })
}

pub fn navigate(url: &str) -> Value {
    json!({ "url": url })
}

pub fn window_rect(width: u32, height: u32) -> Value {
    json!({ "width": width, "height": height })
}

pub fn find_css(selector: &str) -> Value {
    json!({ "using": "css selector", "value": selector })
}

/// One keyboard input source typing every word and pressing Enter after each.
///
/// Characters are sent uppercased, one `keyDown`/`keyUp` pair each.
pub fn type_words(words: &[impl AsRef<str>]) -> Value {
    let mut actions = Vec::new();
    for word in words {
        for ch in word.as_ref().chars() {
            press(&mut actions, ch.to_ascii_uppercase());
        }
        press(&mut actions, ENTER_KEY);
    }

    json!({
        "actions": [{
            "type": "key",
            "id": "keyboard",
            "actions": actions,
        }],
    })
}

fn press(actions: &mut Vec<Value>, key: char) {
    let key = key.to_string();
    actions.push(json!({ "type": "keyDown", "value": key }));
    actions.push(json!({ "type": "keyUp", "value": key }));
}

/// Session id from a new-session response.
///
/// W3C drivers nest it under `value`; older ones put it at the top level.
pub fn session_id(body: &Value) -> Option<&str> {
    body.pointer("/value/sessionId")
        .or_else(|| body.get("sessionId"))
        .and_then(Value::as_str)
}

/// Element reference from a find-element response.
pub fn element_id(body: &Value) -> Option<&str> {
    body.get("value")?.get(ELEMENT_KEY)?.as_str()
}

/// A `value` that is a string or `null`.
///
/// Returns `None` when the body has no such field or it holds anything else.
#[allow(clippy::option_option)]
pub fn nullable_string(body: &Value) -> Option<Option<&str>> {
    match body.get("value")? {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.as_str())),
        _ => None,
    }
}

/// Human-readable detail for a failed response.
///
/// Uses the `WebDriver` error object (`value.error`, `value.message`) when
/// the body has one, and the raw body otherwise.
pub fn error_detail(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.pointer("/value/error")?.as_str());
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/value/message")?.as_str());

    match (error, message) {
        (Some(error), Some(message)) => format!("{error}: {}", first_line(message)),
        (Some(error), None) => error.to_string(),
        _ => body.trim().to_string(),
    }
}

/// Chrome appends multi-line stack dumps to messages; keep the first line.
fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}
