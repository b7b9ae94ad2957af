//! 浏览器风格请求头
//!
//! 上游只接受来自其网页端的请求，每次调用都模拟一个真实浏览器。

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, InvalidHeaderValue,
    ORIGIN, REFERER, USER_AGENT,
};

const ACCEPT_ALL: &str = "*/*";
const ACCEPT_LANGUAGE_ZH: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// 桌面平台标识
const PLATFORMS: [&str; 4] = [
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "Windows NT 11.0; Win64; x64",
];

/// 生成一个随机但真实的浏览器 User-Agent
pub fn random_user_agent() -> String {
    let platform = PLATFORMS[fastrand::usize(..PLATFORMS.len())];

    match fastrand::u8(..10) {
        // Chrome 占绝大多数
        0..=5 => {
            let major = fastrand::u32(120..=131);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.0.0 Safari/537.36"
            )
        }
        6 | 7 => {
            let major = fastrand::u32(120..=131);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.0.0"
            )
        }
        8 => {
            let major = fastrand::u32(121..=133);
            let gecko_platform = if platform.starts_with("Macintosh") {
                "Macintosh; Intel Mac OS X 10.15"
            } else {
                platform
            };
            format!(
                "Mozilla/5.0 ({gecko_platform}; rv:{major}.0) Gecko/20100101 Firefox/{major}.0"
            )
        }
        _ => {
            let minor = fastrand::u32(0..=6);
            let major = fastrand::u32(16..=18);
            format!(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{major}.{minor} Safari/605.1.15"
            )
        }
    }
}

/// 构建上游请求头
///
/// `json_body` 为 false 时不带 `Content-Type`（轮询 GET 请求）。
pub fn build_headers(
    site: &str,
    session_token: &str,
    json_body: bool,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let site = site.trim_end_matches('/');
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ALL));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_ZH));
    if json_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers.insert(ORIGIN, HeaderValue::from_str(site)?);
    headers.insert(REFERER, HeaderValue::from_str(&format!("{}/", site))?);
    headers.insert(USER_AGENT, HeaderValue::from_str(&random_user_agent())?);
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("session={}", session_token))?,
    );

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_user_agent_is_browser_like() {
        for _ in 0..50 {
            let ua = random_user_agent();
            assert!(ua.starts_with("Mozilla/5.0 ("));
            assert!(HeaderValue::from_str(&ua).is_ok());
        }
    }

    #[test]
    fn test_build_headers_for_generate() {
        let headers = build_headers("https://banana.listenhub.ai", "tok", true).unwrap();
        assert_eq!(headers[ACCEPT], "*/*");
        assert_eq!(headers[ACCEPT_LANGUAGE], "zh-CN,zh;q=0.9,en;q=0.8");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ORIGIN], "https://banana.listenhub.ai");
        assert_eq!(headers[REFERER], "https://banana.listenhub.ai/");
        assert_eq!(headers[COOKIE], "session=tok");
        assert!(headers.contains_key(USER_AGENT));
    }

    #[test]
    fn test_build_headers_for_poll_has_no_content_type() {
        let headers = build_headers("https://banana.listenhub.ai/", "tok", false).unwrap();
        assert!(!headers.contains_key(CONTENT_TYPE));
        assert_eq!(headers[REFERER], "https://banana.listenhub.ai/");
    }

    #[test]
    fn test_build_headers_rejects_control_chars_in_token() {
        assert!(build_headers("https://banana.listenhub.ai", "bad\ntoken", true).is_err());
    }
}
