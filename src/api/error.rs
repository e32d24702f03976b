use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::feed::cursor::CursorError;

const SUMMARY_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    ServerError,
    ServerFault,
    Malformed,
}

/// How the caller should present an error: next to the current view, or in
/// place of it (the server sent a whole error page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderHint {
    Inline,
    ReplaceDocument,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub hint: RenderHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("server error {status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("server fault {status}: {summary}")]
    Fault { status: StatusCode, summary: String, document: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Cursor(#[from] CursorError),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { ApiError::Timeout } else { ApiError::Http(err) }
    }

    /// Non-success response: HTML bodies are whole error pages, anything else
    /// is a message meant to be shown as-is.
    pub(crate) fn from_response(status: StatusCode, is_html: bool, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body).into_owned();
        if is_html {
            return ApiError::Fault { status, summary: summarize_document(&text), document: text };
        }
        let message = match text.trim() {
            "" => status.canonical_reason().unwrap_or("request failed").to_string(),
            msg => msg.to_string(),
        };
        ApiError::Server { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Http(_) | ApiError::Timeout => ErrorKind::NetworkFailure,
            ApiError::Server { .. } => ErrorKind::ServerError,
            ApiError::Fault { .. } => ErrorKind::ServerFault,
            ApiError::Decode(_) | ApiError::Cursor(_) | ApiError::Url(_) => ErrorKind::Malformed,
        }
    }

    pub fn hint(&self) -> RenderHint {
        match self {
            ApiError::Fault { .. } => RenderHint::ReplaceDocument,
            _ => RenderHint::Inline,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } | ApiError::Fault { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(_) | ApiError::Timeout => true,
            ApiError::Server { status, .. } | ApiError::Fault { status, .. } => status.is_server_error(),
            ApiError::Decode(_) | ApiError::Cursor(_) | ApiError::Url(_) => false,
        }
    }

    pub fn report(&self) -> ErrorReport {
        let message = match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Fault { summary, .. } => summary.clone(),
            other => other.to_string(),
        };
        ErrorReport { kind: self.kind(), message, hint: self.hint(), status: self.status().map(|s| s.as_u16()) }
    }
}

/// Short text for an HTML error page: its title, else its visible body text.
pub(crate) fn summarize_document(document: &str) -> String {
    let html = Html::parse_document(document);
    let text_of = |css: &str| -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        let el = html.select(&selector).next()?;
        let text = el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
        if text.is_empty() { None } else { Some(text) }
    };
    match text_of("title").or_else(|| text_of("body")) {
        Some(text) if text.chars().count() > SUMMARY_MAX_CHARS => {
            let cut: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
            format!("{cut}…")
        }
        Some(text) => text,
        None => "server returned an error page".to_string(),
    }
}
