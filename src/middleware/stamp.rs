//! Role-version stamping of HTML responses.
//!
//! Every HTML page served to a signed-in user carries the user's current role
//! version twice: in an `HttpOnly` cookie and in a small inline script placed
//! before `</head>`. The script compares the version with the one stored in
//! `localStorage` and reloads the page once when the server's is greater, so
//! tabs rendered under old roles refresh themselves. A `<noscript>` refresh
//! covers clients without JavaScript.

use axum::{
    body::Body,
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE},
    },
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use http_body_util::BodyExt;
use tracing::{debug, warn};

use warden_config::StampConfig;
use warden_core::GateFailure;
use warden_observability::{track_gate_failure, track_response_stamped};

const HEAD_CLOSE: &[u8] = b"</head>";

/// Escapes text for use inside HTML attributes and element content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct VersionStamper {
    cookie_name: String,
    secure: bool,
}

impl VersionStamper {
    pub fn new(config: &StampConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            secure: config.secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Guards checked before the body is touched.
    fn check(&self, response: &Response, version: u64) -> Result<(), GateFailure> {
        if response.status().is_redirection() {
            return Err(GateFailure::Stamping("redirect response"));
        }
        if version == 0 {
            return Err(GateFailure::Stamping("no role version"));
        }
        if !is_html(response) {
            return Err(GateFailure::Stamping("not an HTML response"));
        }
        Ok(())
    }

    pub fn cookie(&self, version: u64) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), version.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .permanent()
            .build()
    }

    /// Inline check run by the browser, plus the no-script fallback unless the
    /// request already is that fallback's target.
    pub fn snippet(&self, version: u64, path: &str, query: Option<&str>) -> String {
        // JSON string literal, with '<' escaped so it cannot close the script tag
        let key = serde_json::to_string(&self.cookie_name)
            .unwrap_or_else(|_| "\"rolesVersion\"".to_string())
            .replace('<', "\\u003c");

        let mut snippet = format!(
            "<script>(function(){{try{{var k={key},v={version};\
             var s=Number(localStorage.getItem(k)||0);\
             if(v>s){{localStorage.setItem(k,String(v));location.reload();}}\
             }}catch(e){{}}}})();</script>"
        );

        let marker = format!("{}={}", self.cookie_name, version);
        let already_refreshed = query
            .map(|q| q.split('&').any(|pair| pair == marker))
            .unwrap_or(false);

        if !already_refreshed {
            let target = format!(
                "{}?{}={}",
                path,
                urlencoding::encode(&self.cookie_name),
                version
            );
            snippet.push_str(&format!(
                "<noscript><meta http-equiv=\"refresh\" content=\"0;url={}\"></noscript>",
                escape_html(&target)
            ));
        }

        snippet
    }

    /// Stamps `response` if it is an HTML page for a versioned user; anything
    /// else passes through unchanged.
    pub async fn stamp(
        &self,
        response: Response,
        version: u64,
        path: &str,
        query: Option<&str>,
    ) -> Response {
        if let Err(skipped) = self.check(&response, version) {
            debug!(reason = %skipped, "Response not stamped");
            return response;
        }

        let (mut parts, body) = response.into_parts();

        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(error = %e, "Failed to buffer response body for stamping");
                track_gate_failure("stamping");
                parts.headers.remove(CONTENT_LENGTH);
                return Response::from_parts(parts, Body::empty());
            }
        };

        let Some(at) = bytes
            .windows(HEAD_CLOSE.len())
            .position(|window| window == HEAD_CLOSE)
        else {
            debug!(reason = "no </head>", "Response not stamped");
            return Response::from_parts(parts, Body::from(bytes));
        };

        let snippet = self.snippet(version, path, query);
        let mut stamped = Vec::with_capacity(bytes.len() + snippet.len());
        stamped.extend_from_slice(&bytes[..at]);
        stamped.extend_from_slice(snippet.as_bytes());
        stamped.extend_from_slice(&bytes[at..]);

        parts.headers.remove(CONTENT_LENGTH);
        if let Ok(value) = HeaderValue::from_str(&self.cookie(version).to_string()) {
            parts.headers.append(SET_COOKIE, value);
        }

        track_response_stamped();
        Response::from_parts(parts, Body::from(stamped))
    }
}

impl Default for VersionStamper {
    fn default() -> Self {
        Self::new(&StampConfig::default())
    }
}
