//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (HMR client, error page)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{HMR_CLIENT_JS, ClientVars};
//!
//! let js = HMR_CLIENT_JS.render(&ClientVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for client.js.
    pub struct ClientVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ClientVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__MODSERVE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Browser side of live reload, served at the HMR client public path.
    pub const HMR_CLIENT_JS: Template<ClientVars> = Template::new(include_str!("serve/client.js"));

    /// Variables for error.html.
    pub struct ErrorVars<'a> {
        pub title: &'a str,
        /// Already HTML-escaped
        pub message: &'a str,
    }

    impl TemplateVars for ErrorVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", self.title)
                .replace("__MESSAGE__", self.message)
        }
    }

    /// Error page for failed transforms.
    pub const ERROR_HTML: Template<ErrorVars<'static>> = Template::new(include_str!("serve/error.html"));

}
