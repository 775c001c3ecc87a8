//! HTTP response writers.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::core::{Body, ServeResponse};
use crate::embed::serve::{ClientVars, ERROR_HTML, ErrorVars, HMR_CLIENT_JS};
use crate::html::inject::inject_script;
use crate::html::BootstrapSnippet;
use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};

/// Write a [`ServeResponse`] to the client.
pub fn send(request: Request, response: ServeResponse) -> Result<()> {
    let mut headers = vec![make_header("Content-Type", response.content_type)?];
    for (name, value) in &response.headers {
        headers.push(make_header(name, value)?);
    }
    let status = StatusCode(response.status);

    match response.body {
        None => {
            let mut out = Response::empty(status);
            for header in headers {
                out.add_header(header);
            }
            request.respond(out)?;
        }
        Some(Body::Bytes(bytes)) => {
            let len = bytes.len();
            request.respond(Response::new(status, headers, bytes.as_slice(), Some(len), None))?;
        }
        Some(Body::Reader(reader)) => {
            request.respond(Response::new(status, headers, reader, None, None))?;
        }
    }
    Ok(())
}

/// Respond with the HMR client script from memory.
pub fn respond_client_js(request: Request, ws_port: u16) -> Result<()> {
    let body = HMR_CLIENT_JS.render(&ClientVars { ws_port });
    send(request, ServeResponse::new(200, JAVASCRIPT, body))
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, ServeResponse::new(503, PLAIN, b"503 Service Unavailable".to_vec()))
}

/// Respond with a transform error (500). The page loads the HMR client so it
/// reloads itself once the document is fixed.
pub fn respond_transform_error(
    request: Request,
    error: &anyhow::Error,
    snippet: &BootstrapSnippet,
) -> Result<()> {
    let error_str = format!("{error:#}");
    let message = crate::utils::html::escape(&error_str);
    let body = ERROR_HTML.render(&ErrorVars {
        title: "Transform Error",
        message: &message,
    });
    let body = inject_script(&body, snippet.as_str());
    send(request, ServeResponse::new(500, HTML, body))
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header `{}: {}`", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_header() {
        let header = make_header("ETag", "W/\"1-2\"").unwrap();
        assert_eq!(header.field.as_str().as_str(), "ETag");
        assert_eq!(header.value.as_str(), "W/\"1-2\"");
    }

    #[test]
    fn test_make_header_rejects_non_ascii() {
        assert!(make_header("X-Test", "café").is_err());
    }
}
