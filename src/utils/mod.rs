mod lowercase;
mod words;

use std::time::Duration;

pub use lowercase::*;
pub use words::*;

use crate::statics::USER_AGENT;

pub fn clamp(text: &str, length: usize) -> &str {
    if text.len() <= length {
        text
    } else {
        let mut end = length;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }
}

pub fn http_client(timeout_secs: u64) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Joins a base url and a path, whether or not the base has a trailing slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_char_boundary() {
        assert_eq!(clamp("hello", 10), "hello");
        assert_eq!(clamp("hello", 2), "he");
        assert_eq!(clamp("héllo", 2), "h");
    }

    #[test]
    fn join_url_slashes() {
        assert_eq!(join_url("https://a/", "/b"), "https://a/b");
        assert_eq!(join_url("https://a", "b"), "https://a/b");
    }
}
