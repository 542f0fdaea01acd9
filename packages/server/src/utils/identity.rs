use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const USER_COOKIE: &str = "mafia_user_id";
pub const USER_HEADER: &str = "x-user-id";
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserId>()
            .cloned()
            .ok_or((StatusCode::BAD_REQUEST, "User identity missing"))
    }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn user_id_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, USER_COOKIE).or_else(|| {
        headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

/// Attaches a [`UserId`] to every request, minting one (and setting the
/// cookie) for first-time callers.
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let (user_id, minted) = match user_id_from_headers(request.headers()) {
        Some(user_id) => (user_id, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    request.extensions_mut().insert(UserId(user_id.clone()));

    let mut response = next.run(request).await;
    if minted {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            USER_COOKIE, user_id, COOKIE_MAX_AGE_SECS
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => log::warn!("Could not set identity cookie: {}", e),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; mafia_user_id=abc-123; lang=en"),
        );
        assert_eq!(user_id_from_headers(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn falls_back_to_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static(" u-9 "));
        assert_eq!(user_id_from_headers(&headers).as_deref(), Some("u-9"));
    }

    #[test]
    fn cookie_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("mafia_user_id=from-cookie"));
        headers.insert(USER_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(
            user_id_from_headers(&headers).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("mafia_user_id="));
        assert_eq!(user_id_from_headers(&headers), None);
    }
}
