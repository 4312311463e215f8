// Panel HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, bearer-token state,
// bounded retry and the status-to-error mapping. Endpoint groups (admin,
// nodes, users, ...) are inherent methods in sibling files so this module
// only deals with transport mechanics.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::HttpValidationError;
use crate::schema;
use crate::transport::{DEFAULT_MAX_ATTEMPTS, TransportConfig};

/// Async client for one Marzban panel.
///
/// Owns the HTTP connection pool and, after [`authenticate`], the bearer
/// token sent on every admin call. Each operation resolves after a single
/// logical request; the client never runs requests concurrently on its own.
///
/// `authenticate` takes `&mut self`, everything else `&self`, so a token
/// swap can never interleave with an in-flight request on the same value.
/// To share one client between tasks and still re-authenticate, wrap it in
/// a lock of your choosing (e.g. `tokio::sync::RwLock<MarzbanClient>`);
/// no locking happens inside.
///
/// Expired tokens are not detected or refreshed: the next call fails with
/// [`Error::Unauthorized`].
///
/// [`authenticate`]: MarzbanClient::authenticate
pub struct MarzbanClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    max_attempts: u32,
}

impl MarzbanClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the panel at `base_url` (e.g. `https://panel.example.com`
    /// or `https://example.com/panel`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: None,
            max_attempts: transport.attempts(),
        })
    }

    /// Wrap an existing `reqwest::Client`. Uses the default retry bound.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Start out authenticated with a token obtained elsewhere.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Ensure the path ends with `/` so endpoint segments append after any
    /// sub-path prefix.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `true` once a token is held (from `authenticate` or `with_token`).
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub(crate) fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL. A trailing
    /// `""` segment yields a trailing slash.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send `call` and parse the 2xx body as JSON.
    pub(crate) async fn send_json(&self, call: Call<'_>) -> Result<Value, Error> {
        let body = self.dispatch(&call).await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = body.chars().take(200).collect::<String>();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Send `call` and discard the 2xx body.
    pub(crate) async fn send_empty(&self, call: Call<'_>) -> Result<(), Error> {
        self.dispatch(&call).await.map(|_| ())
    }

    /// Run up to `max_attempts` attempts. Only status-mapped errors are
    /// retried, immediately and without backoff; the last one is returned
    /// as is.
    async fn dispatch(&self, call: &Call<'_>) -> Result<String, Error> {
        let mut attempt = 1;
        loop {
            debug!(attempt, "{} {}", call.method, call.url);

            match self.attempt(call).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, error = %e, "{} {} failed, retrying", call.method, call.url);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, call: &Call<'_>) -> Result<String, Error> {
        let resp = self.build(call).send().await?;
        let status = resp.status();

        if status.is_success() {
            let body = resp.text().await?;
            trace!(%status, body = %body, "response body");
            return Ok(body);
        }

        Err(Self::map_status(resp).await)
    }

    fn build(&self, call: &Call<'_>) -> reqwest::RequestBuilder {
        let mut req = self.http.request(call.method.clone(), call.url.clone());

        if !call.query.is_empty() {
            req = req.query(&call.query);
        }

        match &call.body {
            Body::Empty => {}
            Body::Json(value) => req = req.json(value),
            Body::Form(fields) => req = req.form(fields),
        }

        if call.authorized {
            if let Some(token) = &self.token {
                req = req.bearer_auth(token.expose_secret());
            }
        }

        req
    }

    // ── Status mapping ───────────────────────────────────────────────

    async fn map_status(resp: reqwest::Response) -> Error {
        let status = resp.status();
        match status.as_u16() {
            400 => {
                let raw = resp.text().await.unwrap_or_default();
                Error::BadRequest {
                    message: format!(
                        "Bad request: {}",
                        detail_text(&raw).unwrap_or_else(|| "Unknown error".into())
                    ),
                }
            }
            403 => Error::Unauthorized,
            404 => Error::NotFound,
            409 => {
                let raw = resp.text().await.unwrap_or_default();
                Error::Conflict {
                    message: format!(
                        "Conflict: {}",
                        detail_text(&raw).unwrap_or_else(|| "Resource already exists".into())
                    ),
                }
            }
            422 => {
                let raw = resp.text().await.unwrap_or_default();
                validation_error(&raw)
            }
            code => match resp.error_for_status() {
                Err(e) => Error::Transport(e),
                Ok(_) => Error::UnexpectedStatus { status: code },
            },
        }
    }
}

/// `detail` of a FastAPI-style error body, stringified when not a string.
fn detail_text(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn validation_error(raw: &str) -> Error {
    let structured = serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| schema::parse::<HttpValidationError>(value).ok());

    match structured {
        Some(parsed) if !parsed.detail.is_empty() => {
            let summary: Vec<String> = parsed.detail.iter().map(ToString::to_string).collect();
            Error::Validation {
                message: format!("Validation Error: {}", summary.join("; ")),
                detail: parsed.detail,
            }
        }
        _ => Error::Validation {
            message: format!(
                "Validation Error: {}",
                detail_text(raw).unwrap_or_else(|| "Invalid input".into())
            ),
            detail: Vec::new(),
        },
    }
}

// ── Call description ─────────────────────────────────────────────────

/// Request body of a [`Call`].
pub(crate) enum Body<'a> {
    Empty,
    Json(Value),
    Form(&'a [(&'a str, &'a str)]),
}

/// Everything needed to (re)build one request, so retries send the exact
/// same method, URL, query and body.
pub(crate) struct Call<'a> {
    method: Method,
    url: Url,
    query: Vec<(&'static str, String)>,
    body: Body<'a>,
    authorized: bool,
}

impl<'a> Call<'a> {
    pub(crate) fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            body: Body::Empty,
            authorized: true,
        }
    }

    pub(crate) fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub(crate) fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub(crate) fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    pub(crate) fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub(crate) fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub(crate) fn json(mut self, body: Map<String, Value>) -> Self {
        self.body = Body::Json(Value::Object(body));
        self
    }

    pub(crate) fn form(mut self, fields: &'a [(&'a str, &'a str)]) -> Self {
        self.body = Body::Form(fields);
        self
    }

    /// Send without the bearer token.
    pub(crate) fn anonymous(mut self) -> Self {
        self.authorized = false;
        self
    }
}
