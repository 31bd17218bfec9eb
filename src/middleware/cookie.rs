use axum::http::{header::COOKIE, HeaderMap};

/// Read the session credential from the request's cookies.
///
/// Looks through every `Cookie` header, splitting on semicolons, and returns
/// the first value stored under `cookie_name`. An empty value counts as absent.
/// Nothing about the token itself is checked here.
pub fn extract_credential(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().trim_matches('"'))
        })
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let headers = headers(&["theme=dark; auth-token=abc.def.ghi; cart=3"]);
        assert_eq!(extract_credential(&headers, "auth-token").as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(extract_credential(&HeaderMap::new(), "auth-token"), None);
    }

    #[test]
    fn other_cookies_only_yields_none() {
        let headers = headers(&["theme=dark; auth-token-old=zzz"]);
        assert_eq!(extract_credential(&headers, "auth-token"), None);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let headers = headers(&["auth-token=; theme=dark"]);
        assert_eq!(extract_credential(&headers, "auth-token"), None);
    }

    #[test]
    fn searches_across_multiple_cookie_headers() {
        let headers = headers(&["theme=dark", "auth-token=t0k3n"]);
        assert_eq!(extract_credential(&headers, "auth-token").as_deref(), Some("t0k3n"));
    }

    #[test]
    fn keeps_equals_signs_inside_value() {
        let headers = headers(&["auth-token=a.b.c=="]);
        assert_eq!(extract_credential(&headers, "auth-token").as_deref(), Some("a.b.c=="));
    }
}
