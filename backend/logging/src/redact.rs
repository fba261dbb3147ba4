//! Log Redaction
//!
//! Downstream error bodies are logged for diagnosis. They can echo request
//! URLs or headers, so credentials are scrubbed first.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(AIza[0-9A-Za-z\-_]{35})").unwrap());
static KEY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&](?:key|api_key|token)=)[^&\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_KEY]");
    KEY_PARAM_RE.replace_all(&redacted, "${1}[REDACTED]").into_owned()
}
