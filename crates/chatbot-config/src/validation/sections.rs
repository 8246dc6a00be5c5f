//! Validation for the `[api]` and `[chat]` sections.

use crate::schema::ChatbotConfig;

use super::helpers::{validate_http_url, validate_range};

/// Validate backend URL and timeouts.
pub(crate) fn validate_api(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_http_url(errors, "api.base_url", &config.api.base_url);
    validate_range(
        errors,
        "api.connect_timeout_secs",
        config.api.connect_timeout_secs,
        1,
        600,
    );
    validate_range(
        errors,
        "api.request_timeout_secs",
        config.api.request_timeout_secs,
        1,
        600,
    );
    if config.api.connect_timeout_secs > config.api.request_timeout_secs {
        errors.push(format!(
            "api.connect_timeout_secs ({}) exceeds api.request_timeout_secs ({})",
            config.api.connect_timeout_secs, config.api.request_timeout_secs
        ));
    }
}

/// Validate conversation limits.
pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_range(
        errors,
        "chat.max_input_chars",
        config.chat.max_input_chars,
        1,
        100_000,
    );
}
