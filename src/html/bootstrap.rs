//! Client bootstrap snippet injected into every served page.

/// Public path the HMR client script is served under.
pub const HMR_CLIENT_PUBLIC_PATH: &str = "/@modserve/client";

/// Mode used when none is configured.
pub const DEFAULT_MODE: &str = "development";

/// Pre-rendered `<script type="module">` block that loads the HMR client and
/// defines `process.env.NODE_ENV` for code written against Node conventions.
///
/// Built once per configuration and shared by all transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSnippet(String);

impl BootstrapSnippet {
    pub fn new(mode: &str) -> Self {
        // JSON string literal so quotes and backslashes in the mode stay valid JS
        let mode = serde_json::Value::from(mode).to_string();
        Self(format!(
            "\n<script type=\"module\">\nimport \"{HMR_CLIENT_PUBLIC_PATH}\"\nwindow.process = {{ env: {{ NODE_ENV: {mode} }}}}\n</script>\n"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BootstrapSnippet {
    fn default() -> Self {
        Self::new(DEFAULT_MODE)
    }
}
