//! Shared input validation for tool arguments.
//!
//! Everything here is pure: no network, no session state.

/// Accepted post URL prefixes, with and without `www.`.
const POST_URL_PREFIXES: [&str; 2] = [
    "https://www.instagram.com/p/",
    "https://instagram.com/p/",
];

fn is_post_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

/// Returns the shortcode of a post URL, or `None` if the URL is not a post URL.
fn post_code(url: &str) -> Option<&str> {
    let rest = POST_URL_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))?;
    let code = rest.strip_suffix('/').unwrap_or(rest);
    if !code.is_empty() && code.chars().all(is_post_code_char) {
        Some(code)
    } else {
        None
    }
}

/// True iff `url` is `https://[www.]instagram.com/p/<code>[/]`.
pub fn is_valid_post_url(url: &str) -> bool {
    post_code(url).is_some()
}

/// Extract the post shortcode from a post URL.
///
/// Returns an empty string when the URL does not match; callers are expected
/// to check [`is_valid_post_url`] first.
pub fn extract_post_id(url: &str) -> String {
    post_code(url).map(str::to_string).unwrap_or_default()
}

/// True iff `handle` is non-empty and only contains `[A-Za-z0-9._]`.
pub fn is_valid_username(handle: &str) -> bool {
    !handle.is_empty() && handle.chars().all(is_username_char)
}

/// Validate a post URL, returning a user-facing message on failure.
pub fn validate_post_url(url: &str) -> Result<(), String> {
    if is_valid_post_url(url) {
        Ok(())
    } else {
        Err(format!(
            "Invalid Instagram post URL '{}'. Expected https://www.instagram.com/p/<code>/",
            url
        ))
    }
}

/// Validate an account handle, returning a user-facing message on failure.
pub fn validate_username(handle: &str) -> Result<(), String> {
    if handle.is_empty() {
        return Err("Username must not be empty".to_string());
    }
    if !is_valid_username(handle) {
        return Err(format!(
            "Invalid username '{}': only letters, digits, periods, and underscores are allowed",
            handle
        ));
    }
    Ok(())
}

/// Collect every handle that fails [`is_valid_username`], in input order.
pub fn invalid_usernames(handles: &[String]) -> Vec<String> {
    handles
        .iter()
        .filter(|h| !is_valid_username(h))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODES: [&str; 6] = ["abc123", "C0dE_-x", "_", "-", "DxYz9AbCdEf", "a-b_c"];

    #[test]
    fn test_post_url_valid_forms() {
        for code in CODES {
            for host in ["https://www.instagram.com", "https://instagram.com"] {
                let with_slash = format!("{}/p/{}/", host, code);
                let without_slash = format!("{}/p/{}", host, code);
                assert!(is_valid_post_url(&with_slash), "{}", with_slash);
                assert!(is_valid_post_url(&without_slash), "{}", without_slash);
                assert_eq!(extract_post_id(&with_slash), code);
                assert_eq!(extract_post_id(&without_slash), code);
            }
        }
    }

    #[test]
    fn test_post_url_without_post_segment() {
        assert!(!is_valid_post_url("https://www.instagram.com/brand_x/"));
        assert!(!is_valid_post_url("https://www.instagram.com/reel/abc123/"));
        assert!(!is_valid_post_url("instagram.com"));
        assert!(!is_valid_post_url(""));
    }

    #[test]
    fn test_post_url_invalid() {
        assert!(!is_valid_post_url("http://www.instagram.com/p/abc123/"));
        assert!(!is_valid_post_url("https://www.instagram.com/p/"));
        assert!(!is_valid_post_url("https://www.instagram.com/p//"));
        assert!(!is_valid_post_url("https://www.instagram.com/p/abc!123/"));
        assert!(!is_valid_post_url("https://www.instagram.com/p/abc/extra"));
        assert!(!is_valid_post_url("https://www.instagram.com/p/abc?igsh=1"));
        assert!(!is_valid_post_url("https://evil.com/p/abc123/"));
        assert!(!is_valid_post_url("https://m.instagram.com/p/abc123/"));
    }

    #[test]
    fn test_extract_post_id_no_match_is_empty() {
        assert_eq!(extract_post_id("https://www.instagram.com/brand_x/"), "");
        assert_eq!(extract_post_id("not a url"), "");
    }

    #[test]
    fn test_username_valid() {
        assert!(is_valid_username("brand_x"));
        assert!(is_valid_username("valid_user"));
        assert!(is_valid_username("first.last"));
        assert!(is_valid_username("A1"));
        assert!(is_valid_username("._."));
    }

    #[test]
    fn test_username_invalid() {
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("@brand_x"));
        assert!(!is_valid_username("bad user!"));
        assert!(!is_valid_username("tab\there"));
        assert!(!is_valid_username("new\nline"));
        assert!(!is_valid_username("dash-name"));
        assert!(!is_valid_username("ünïcode"));
    }

    #[test]
    fn test_validate_messages() {
        assert!(validate_post_url("https://instagram.com/p/abc/").is_ok());
        let err = validate_post_url("https://instagram.com/").unwrap_err();
        assert!(err.contains("Invalid Instagram post URL"));
        assert!(validate_username("brand_x").is_ok());
        assert!(validate_username("").unwrap_err().contains("empty"));
        assert!(validate_username("a b").unwrap_err().contains("'a b'"));
    }

    #[test]
    fn test_invalid_usernames_collects_all_in_order() {
        let handles = vec![
            "ok_one".to_string(),
            "bad one".to_string(),
            "ok.two".to_string(),
            "@bad".to_string(),
        ];
        assert_eq!(invalid_usernames(&handles), vec!["bad one", "@bad"]);
        assert!(invalid_usernames(&["fine".to_string()]).is_empty());
    }
}
