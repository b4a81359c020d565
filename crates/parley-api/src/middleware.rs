use axum::http::{HeaderMap, header};

/// Shared-secret check for the `Authorization: authkey <secret>` scheme
/// used throughout the federation.
pub fn authorized(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("authkey "))
        .is_some_and(|key| key == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("header value"),
        );
        headers
    }

    #[test]
    fn matching_key_passes() {
        assert!(authorized(&headers_with("authkey s3cret"), "s3cret"));
    }

    #[test]
    fn wrong_scheme_or_key_fails() {
        assert!(!authorized(&headers_with("Bearer s3cret"), "s3cret"));
        assert!(!authorized(&headers_with("authkey other"), "s3cret"));
        assert!(!authorized(&HeaderMap::new(), "s3cret"));
    }
}
