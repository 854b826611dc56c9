use axum::http::{header, HeaderMap};

/// Effective origin: explicit body field, then `Origin`, then `Referer`.
pub fn resolve_origin(explicit: Option<&str>, headers: &HeaderMap) -> Option<String> {
    let non_empty = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    explicit
        .and_then(non_empty)
        .or_else(|| header_value(headers, header::ORIGIN).and_then(non_empty))
        .or_else(|| header_value(headers, header::REFERER).and_then(non_empty))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
