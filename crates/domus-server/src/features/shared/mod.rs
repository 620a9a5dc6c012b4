//! Utilities shared across feature slices.

pub mod pagination;

pub use pagination::{Paginated, PaginationMetadata, PaginationParams};

use axum::http::HeaderMap;

/// Header carrying the acting principal's identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Principal taken from the request headers. Requests without the header are
/// attributed to "anonymous"; ownership is advisory, not an auth boundary.
pub fn principal(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_principal_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        assert_eq!(principal(&headers), "alice");
    }

    #[test]
    fn test_principal_defaults_to_anonymous() {
        assert_eq!(principal(&HeaderMap::new()), "anonymous");
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(principal(&headers), "anonymous");
    }
}
