//! 认证工具
//!
//! 客户端的 Bearer token 即上游的 session，本服务不做校验，只负责提取

use axum::{body::Body, http::Request, http::header};

/// 从请求中提取后的上游 session token
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// 从 `Authorization: Bearer <token>` 中提取 token
///
/// 缺少请求头或前缀不是 `Bearer ` 时返回 `None`
pub fn extract_bearer_token(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/v1/chat/completions");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&request_with(Some("Bearer abc.def"))).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_extract_bearer_token_missing_or_malformed() {
        assert!(extract_bearer_token(&request_with(None)).is_none());
        assert!(extract_bearer_token(&request_with(Some("Basic abc"))).is_none());
        assert!(extract_bearer_token(&request_with(Some("bearer abc"))).is_none());
    }
}
