use axum::http::HeaderMap;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuses a well-formed incoming `x-request-id`, otherwise mints a UUID.
pub fn request_id_for(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| {
            !v.is_empty()
                && v.len() <= 128
                && v.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reuses_incoming_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id_for(&headers), "abc-123");
    }

    #[test]
    fn test_generates_when_missing_or_malformed() {
        let id = request_id_for(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("has spaces;"));
        assert_ne!(request_id_for(&headers), "has spaces;");
    }
}
