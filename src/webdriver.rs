//! Remote browser client over the W3C `WebDriver` protocol.
//!
//! Every operation is one blocking HTTP+JSON request against the driver
//! endpoint (`chromedriver` by default). Calls carry a fixed overall timeout;
//! a hung browser surfaces as a transport error the operator can retry.
//!
//! The solver talks to the browser through the [`Browser`] trait so the
//! attempt logic does not depend on HTTP.

mod payload;

#[cfg(test)]
pub mod fake;

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{ElementId, SessionId};

/// Where `chromedriver` listens unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9515";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Errors from a single remote operation.
#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} {context}: {detail}")]
    Status {
        context: String,
        status: u16,
        detail: String,
    },

    #[error("{context}: unexpected response: {body}")]
    Malformed { context: String, body: String },
}

impl WebDriverError {
    /// HTTP status of the failed response, when the driver answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Malformed { .. } => None,
        }
    }

    /// Whether the driver no longer knows the session (browser closed by hand, driver restarted).
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::Status { status: 404, detail, .. } if detail.starts_with("invalid session id")
        )
    }
}

pub type Result<T> = core::result::Result<T, WebDriverError>;

/// The browser operations the solver needs.
pub trait Browser {
    /// Starts a new visible browser session that outlives this process.
    fn create_session(&self) -> Result<SessionId>;

    fn delete_session(&self, session: &SessionId) -> Result<()>;

    fn navigate(&self, session: &SessionId, url: &str) -> Result<()>;

    fn resize_window(&self, session: &SessionId, width: u32, height: u32) -> Result<()>;

    /// Locates the first element matching a CSS selector.
    fn find_element_css(&self, session: &SessionId, selector: &str) -> Result<ElementId>;

    /// Rendered text of an element; empty when the driver reports none.
    fn element_text(&self, session: &SessionId, element: &ElementId) -> Result<String>;

    /// An attribute's value, `None` when the element doesn't have it.
    fn element_attribute(
        &self,
        session: &SessionId,
        element: &ElementId,
        name: &str,
    ) -> Result<Option<String>>;

    fn click_element(&self, session: &SessionId, element: &ElementId) -> Result<()>;

    /// Types every word into the focused page, pressing Enter after each.
    ///
    /// The whole list goes out as one key-action request.
    fn send_words(&self, session: &SessionId, words: &[String]) -> Result<()>;
}

/// HTTP client bound to one `WebDriver` endpoint.
pub struct WebDriver {
    http: Client,
    base_url: String,
}

impl WebDriver {
    /// Creates a client for the endpoint at `base_url` (e.g. `http://localhost:9515`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .default_headers(headers)
            .build()
            .map_err(|source| WebDriverError::Transport {
                context: "building HTTP client".to_string(),
                source,
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and returns the parsed JSON body of a 2xx response.
    fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        context: &str,
    ) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %path, "webdriver request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |source| WebDriverError::Transport {
            context: context.to_string(),
            source,
        };
        let response = request.send().map_err(transport)?;
        let status = response.status();
        let text = response.text().map_err(transport)?;

        if !status.is_success() {
            let err = WebDriverError::Status {
                context: context.to_string(),
                status: status.as_u16(),
                detail: payload::error_detail(&text),
            };
            warn!(%path, status = ?err.http_status(), error = %err, "webdriver request failed");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|_| WebDriverError::Malformed {
            context: context.to_string(),
            body: text,
        })
    }

    fn malformed(context: &str, body: &Value) -> WebDriverError {
        WebDriverError::Malformed {
            context: context.to_string(),
            body: body.to_string(),
        }
    }
}

impl Browser for WebDriver {
    fn create_session(&self) -> Result<SessionId> {
        let context = "creating session";
        let body = self.execute(Method::POST, "/session", Some(&payload::new_session()), context)?;
        payload::session_id(&body)
            .map(SessionId::new)
            .ok_or_else(|| Self::malformed(context, &body))
    }

    fn delete_session(&self, session: &SessionId) -> Result<()> {
        self.execute(
            Method::DELETE,
            &format!("/session/{session}"),
            None,
            "deleting session",
        )?;
        Ok(())
    }

    fn navigate(&self, session: &SessionId, url: &str) -> Result<()> {
        self.execute(
            Method::POST,
            &format!("/session/{session}/url"),
            Some(&payload::navigate(url)),
            &format!("navigating to {url}"),
        )?;
        Ok(())
    }

    fn resize_window(&self, session: &SessionId, width: u32, height: u32) -> Result<()> {
        self.execute(
            Method::POST,
            &format!("/session/{session}/window/rect"),
            Some(&payload::window_rect(width, height)),
            "setting window size",
        )?;
        Ok(())
    }

    fn find_element_css(&self, session: &SessionId, selector: &str) -> Result<ElementId> {
        let context = format!("finding element ({selector})");
        let body = self.execute(
            Method::POST,
            &format!("/session/{session}/element"),
            Some(&payload::find_css(selector)),
            &context,
        )?;
        payload::element_id(&body)
            .map(ElementId::new)
            .ok_or_else(|| Self::malformed(&context, &body))
    }

    fn element_text(&self, session: &SessionId, element: &ElementId) -> Result<String> {
        let context = "getting element text";
        let body = self.execute(
            Method::GET,
            &format!("/session/{session}/element/{element}/text"),
            None,
            context,
        )?;
        payload::nullable_string(&body)
            .map(|text| text.unwrap_or_default().to_string())
            .ok_or_else(|| Self::malformed(context, &body))
    }

    fn element_attribute(
        &self,
        session: &SessionId,
        element: &ElementId,
        name: &str,
    ) -> Result<Option<String>> {
        let context = format!("getting attribute {name}");
        let body = self.execute(
            Method::GET,
            &format!("/session/{session}/element/{element}/attribute/{name}"),
            None,
            &context,
        )?;
        payload::nullable_string(&body)
            .map(|value| value.map(str::to_string))
            .ok_or_else(|| Self::malformed(&context, &body))
    }

    fn click_element(&self, session: &SessionId, element: &ElementId) -> Result<()> {
        self.execute(
            Method::POST,
            &format!("/session/{session}/element/{element}/click"),
            Some(&Value::Object(serde_json::Map::new())),
            "clicking element",
        )?;
        Ok(())
    }

    fn send_words(&self, session: &SessionId, words: &[String]) -> Result<()> {
        self.execute(
            Method::POST,
            &format!("/session/{session}/actions"),
            Some(&payload::type_words(words)),
            "sending key actions",
        )?;
        Ok(())
    }
}
