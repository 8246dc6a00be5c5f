//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Chatbot Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[api]
# base_url = "http://localhost:8000"   # CHATBOT_API_URL overrides this
# connect_timeout_secs = 10            # 1-600
# request_timeout_secs = 120           # 1-600, >= connect_timeout_secs

[chat]
# greeting = "Hello! Ask me anything."  # "" starts with an empty log
# max_input_chars = 4000               # 1-100000

[logging]
# level = "INFO"                       # TRACE, DEBUG, INFO, WARNING, ERROR
"##
}
