//! Banana 上游错误类型

/// 轮询超时的错误消息
pub const TIMEOUT_MESSAGE: &str = "Timeout waiting for image generation";

/// 上游调用错误
#[derive(Debug)]
pub enum UpstreamError {
    /// 生成接口返回非成功状态（重试后仍失败）
    Generate { status: u16 },
    /// 任务查询接口返回非成功状态
    Poll { status: u16 },
    /// 上游报告任务失败
    TaskFailed(String),
    /// 轮询次数耗尽仍未结束
    Timeout,
    /// 上游响应结构不符合预期
    InvalidResponse(String),
    /// session token 无法放入请求头
    InvalidSessionToken,
    /// 网络层错误
    Http(reqwest::Error),
}

impl UpstreamError {
    /// 上游返回的 HTTP 状态码（如有）
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Generate { status } | UpstreamError::Poll { status } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Generate { status } => {
                write!(f, "Upstream request failed: {}", status)
            }
            UpstreamError::Poll { status } => write!(f, "Poll failed: {}", status),
            UpstreamError::TaskFailed(message) => write!(f, "{}", message),
            UpstreamError::Timeout => write!(f, "{}", TIMEOUT_MESSAGE),
            UpstreamError::InvalidResponse(message) => {
                write!(f, "Invalid upstream response: {}", message)
            }
            UpstreamError::InvalidSessionToken => write!(f, "Invalid session token"),
            UpstreamError::Http(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for UpstreamError {
    fn from(_: reqwest::header::InvalidHeaderValue) -> Self {
        UpstreamError::InvalidSessionToken
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Http(e)
    }
}
