//! Browser sessions and viewer identity.
//!
//! Every request carries an opaque session token in a cookie. The
//! [`ensure_session`] middleware mints one when absent and exposes it to
//! handlers as the [`SessionToken`] extractor. Signed-in identity comes from
//! headers set by the upstream authentication proxy and is read by the
//! [`Viewer`] extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;
use ulid::Ulid;

use crate::config::IdentityConfig;
use crate::handlers::problem_details;
use crate::server::AppState;
pub use crate::story::Viewer;

const MAX_TOKEN_LEN: usize = 128;

// ============================================================================
// Session token
// ============================================================================

/// Opaque per-browser token keying session progress and the player profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Value of cookie `name`, if present.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

fn session_cookie(name: &str, token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{name}={token}; HttpOnly; SameSite=Lax; Path=/")).ok()
}

/// Middleware that guarantees a [`SessionToken`] request extension.
pub async fn ensure_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.session.cookie_name.as_str();
    let existing = read_cookie(request.headers(), cookie_name).filter(|t| is_valid_token(t));
    let minted = existing.is_none();
    let token = existing.unwrap_or_else(|| Ulid::new().to_string());

    request
        .extensions_mut()
        .insert(SessionToken(token.clone()));
    let mut response = next.run(request).await;

    if minted {
        match session_cookie(cookie_name, &token) {
            Some(cookie) => {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            None => warn!(cookie_name, "Session cookie name is not a valid header value"),
        }
    }
    response
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| {
                problem_details::internal_error("session middleware not installed").into_response()
            })
    }
}

// ============================================================================
// Viewer
// ============================================================================

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Identity asserted by the upstream proxy.
pub fn viewer_from_headers(headers: &HeaderMap, identity: &IdentityConfig) -> Viewer {
    let user_id = header_str(headers, &identity.user_header).map(str::to_string);
    let is_staff = user_id.is_some()
        && header_str(headers, &identity.staff_header).is_some_and(|v| {
            matches!(
                v.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        });
    Viewer { user_id, is_staff }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(viewer_from_headers(&parts.headers, &state.identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn reads_named_cookie() {
        let h = headers(&[("cookie", "a=1; taleweaver_session=01ABC; b=2")]);
        assert_eq!(read_cookie(&h, "taleweaver_session").as_deref(), Some("01ABC"));
        assert_eq!(read_cookie(&h, "missing"), None);
    }

    #[test]
    fn reads_cookie_across_multiple_headers() {
        let h = headers(&[("cookie", "a=1"), ("cookie", "sid=xyz")]);
        assert_eq!(read_cookie(&h, "sid").as_deref(), Some("xyz"));
    }

    #[test]
    fn token_validation() {
        assert!(is_valid_token(&Ulid::new().to_string()));
        assert!(is_valid_token("abc-DEF_123"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token("has space"));
        assert!(!is_valid_token(&"x".repeat(MAX_TOKEN_LEN + 1)));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("sid", "tok").unwrap();
        assert_eq!(cookie, "sid=tok; HttpOnly; SameSite=Lax; Path=/");
    }

    #[test]
    fn viewer_from_proxy_headers() {
        let identity = IdentityConfig::default();

        let viewer = viewer_from_headers(&headers(&[]), &identity);
        assert_eq!(viewer, Viewer::anonymous());

        let viewer = viewer_from_headers(&headers(&[("x-remote-user", "alice")]), &identity);
        assert_eq!(viewer, Viewer::user("alice"));

        let viewer = viewer_from_headers(
            &headers(&[("x-remote-user", "mod"), ("x-remote-staff", "True")]),
            &identity,
        );
        assert_eq!(viewer, Viewer::staff("mod"));
    }

    #[test]
    fn staff_flag_requires_user() {
        let identity = IdentityConfig::default();
        let viewer = viewer_from_headers(&headers(&[("x-remote-staff", "1")]), &identity);
        assert!(!viewer.is_staff);
    }
}
