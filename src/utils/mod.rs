//! Small shared helpers: MIME detection, HTML escaping and URL path handling.

pub mod html;
pub mod mime;
pub mod url;
