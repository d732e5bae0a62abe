//! Bearer-token helpers for the HTTP surface.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use sr_03_admission::constant_time_compare;

/// Token from `Authorization: bearer <token>`, scheme matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|token| !token.is_empty())
}

/// Admin endpoints require the header to be exactly `bearer <password>`.
/// An empty password locks them.
pub fn is_admin(headers: &HeaderMap, admin_password: &str) -> bool {
    if admin_password.is_empty() {
        return false;
    }
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    constant_time_compare(value, &format!("bearer {}", admin_password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_admin_requires_exact_header() {
        assert!(is_admin(&headers("bearer hunter2"), "hunter2"));
        assert!(!is_admin(&headers("Bearer hunter2"), "hunter2"));
        assert!(!is_admin(&headers("bearer hunter"), "hunter2"));
        assert!(!is_admin(&HeaderMap::new(), "hunter2"));
        assert!(!is_admin(&headers("bearer "), ""));
    }
}
