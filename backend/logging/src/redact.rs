//! Log Redaction Layer
//!
//! Scrubs wallet private keys and bearer tokens from strings prior to logging.
//! Plugin configs routinely carry signing keys, so everything a plugin logs
//! through its scoped logger passes through here.

use regex::Regex;
use std::sync::LazyLock;

static PRIVATE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b0x[0-9a-fA-F]{64}\b").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Nothing to scrub in the common case.
    if !input.contains("0x") && !input.contains("Bearer") {
        return input.to_string();
    }

    let redacted = PRIVATE_KEY_RE.replace_all(input, "[REDACTED_KEY]");
    BEARER_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string()
}
