//! OpenAI API 类型定义

use serde::{Deserialize, Serialize};

/// 请求未指定模型时使用的默认模型
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";

// === 错误响应 ===

/// OpenAI API 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// 错误详情
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    /// 与 HTTP 状态码一致
    pub code: u16,
}

impl ErrorResponse {
    /// 创建新的错误响应
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                error_type: "server_error".to_string(),
                code,
            },
        }
    }

    /// 创建认证错误响应
    pub fn authentication_error() -> Self {
        Self::new("Missing or invalid Authorization header", 401)
    }
}

// === 模型列表 ===

/// `GET /v1/models` 响应
#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<Model>,
}

/// 模型条目
#[derive(Debug, Serialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

// === Chat Completions 请求类型 ===

/// Chat Completions 请求体
///
/// 只关心生成图片需要的字段，其余字段忽略。
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    /// 只有字面量 `true` 才启用流式
    #[serde(default)]
    pub stream: Option<serde_json::Value>,
}

impl ChatCompletionRequest {
    /// 请求的模型名，缺省为默认模型
    pub fn model_or_default(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// 是否启用流式响应
    pub fn is_stream(&self) -> bool {
        matches!(self.stream, Some(serde_json::Value::Bool(true)))
    }
}

/// 聊天消息
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: String,
    /// 可以是 string 或 ContentPart 数组
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// 消息内容（可以是字符串或内容部分数组）
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// 内容部分
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
    /// 其他类型（如 input_audio）直接忽略
    #[serde(other)]
    Other,
}

/// 图片 URL
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// === Chat Completions 响应类型 ===

/// Chat Completions 响应
#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

/// 选择
#[derive(Debug, Serialize)]
pub struct Choice {
    pub index: i32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

/// 响应消息
#[derive(Debug, Serialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: String,
}

/// Token 使用统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct Usage {
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
}

// === 流式响应类型 ===

/// 流式响应 chunk
#[derive(Debug, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

/// 流式选择
#[derive(Debug, Serialize)]
pub struct ChunkChoice {
    pub index: i32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

/// 增量内容
#[derive(Debug, Default, Serialize)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_content_parts() {
        let req: ChatCompletionRequest = serde_json::from_value(serde_json::json!({
            "model": "gemini-3-pro-image-preview-4k",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "hi"},
                    {"type": "input_audio", "input_audio": {"data": "x"}},
                    {"type": "image_url", "image_url": {"url": "https://a/b.png"}}
                ]
            }],
            "temperature": 0.2
        }))
        .unwrap();

        let Some(MessageContent::Parts(parts)) = &req.messages[0].content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[1], ContentPart::Other));
        assert!(!req.is_stream());
    }

    #[test]
    fn test_stream_flag_requires_literal_true() {
        let parse = |stream: serde_json::Value| -> ChatCompletionRequest {
            serde_json::from_value(serde_json::json!({"messages": [], "stream": stream})).unwrap()
        };
        assert!(parse(serde_json::json!(true)).is_stream());
        assert!(!parse(serde_json::json!("true")).is_stream());
        assert!(!parse(serde_json::json!(1)).is_stream());
        assert!(!parse(serde_json::json!(false)).is_stream());
    }

    #[test]
    fn test_model_defaults() {
        let req: ChatCompletionRequest =
            serde_json::from_value(serde_json::json!({"messages": []})).unwrap();
        assert_eq!(req.model_or_default(), DEFAULT_MODEL);

        let req: ChatCompletionRequest =
            serde_json::from_value(serde_json::json!({"model": "", "messages": []})).unwrap();
        assert_eq!(req.model_or_default(), DEFAULT_MODEL);
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::authentication_error()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": {
                "message": "Missing or invalid Authorization header",
                "type": "server_error",
                "code": 401
            }})
        );
    }
}
