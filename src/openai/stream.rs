//! OpenAI 响应格式化模块
//!
//! 将生成的图片 URL 渲染为 chat.completion 或 SSE chunk 序列

use super::types::{
    ChatCompletionChunk, ChatCompletionResponse, Choice, ChunkChoice, Delta, ResponseMessage,
    Usage,
};

/// 响应 ID 随机部分长度
const RESPONSE_ID_LEN: usize = 16;

/// 生成 `chatcmpl-` + 16 位字母数字的响应 ID
pub fn generate_response_id() -> String {
    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(RESPONSE_ID_LEN)
        .collect();
    format!("chatcmpl-{}", suffix)
}

/// 图片的 markdown 表示
pub fn image_markdown(image_url: &str) -> String {
    format!("![image]({})", image_url)
}

/// 单次响应上下文
pub struct StreamContext {
    /// 请求的模型名称
    pub model: String,
    /// 响应 ID
    pub response_id: String,
    /// 创建时间戳
    pub created: i64,
}

impl StreamContext {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response_id: generate_response_id(),
            created: chrono::Utc::now().timestamp(),
        }
    }

    fn chunk(&self, delta: Delta, finish_reason: Option<String>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.response_id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }

    /// 携带图片内容的 chunk
    pub fn content_chunk(&self, image_url: &str) -> ChatCompletionChunk {
        self.chunk(
            Delta {
                content: Some(image_markdown(image_url)),
            },
            None,
        )
    }

    /// 结束 chunk（空 delta + stop）
    pub fn final_chunk(&self) -> ChatCompletionChunk {
        self.chunk(Delta::default(), Some("stop".to_string()))
    }

    /// 完整的 SSE 帧序列：内容 chunk、结束 chunk、`[DONE]`
    pub fn sse_frames(&self, image_url: &str) -> Vec<String> {
        vec![
            chunk_to_sse(&self.content_chunk(image_url)),
            chunk_to_sse(&self.final_chunk()),
            done_sse(),
        ]
    }

    /// 非流式 chat.completion 响应
    pub fn completion(&self, image_url: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: self.response_id.clone(),
            object: "chat.completion".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    role: "assistant".to_string(),
                    content: image_markdown(image_url),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: Usage::default(),
        }
    }
}

/// 将 chunk 转换为 SSE 字符串
pub fn chunk_to_sse(chunk: &ChatCompletionChunk) -> String {
    format!(
        "data: {}\n\n",
        serde_json::to_string(chunk).unwrap_or_default()
    )
}

/// 生成 [DONE] SSE 字符串
pub fn done_sse() -> String {
    "data: [DONE]\n\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_response_id() {
        let id = generate_response_id();
        let suffix = id.strip_prefix("chatcmpl-").unwrap();
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_response_id());
    }

    #[test]
    fn test_chunk_to_sse() {
        let ctx = StreamContext::new("test");
        let sse = chunk_to_sse(&ctx.final_chunk());
        assert!(sse.starts_with("data: "));
        assert!(sse.ends_with("\n\n"));
    }

    #[test]
    fn test_sse_frames() {
        let ctx = StreamContext::new("gemini-3-pro-image-preview-1k-9:16");
        let frames = ctx.sse_frames("https://img/1.png");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2], "data: [DONE]\n\n");

        let first: serde_json::Value =
            serde_json::from_str(frames[0].trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(first["object"], "chat.completion.chunk");
        assert_eq!(first["model"], "gemini-3-pro-image-preview-1k-9:16");
        assert_eq!(
            first["choices"][0]["delta"]["content"],
            "![image](https://img/1.png)"
        );
        assert!(first["choices"][0]["finish_reason"].is_null());

        let second: serde_json::Value =
            serde_json::from_str(frames[1].trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(second["id"], first["id"]);
        assert_eq!(second["choices"][0]["delta"], serde_json::json!({}));
        assert_eq!(second["choices"][0]["finish_reason"], "stop");
    }

    #[test]
    fn test_completion_shape() {
        let ctx = StreamContext::new("m");
        let json = serde_json::to_value(ctx.completion("https://img/2.png")).unwrap();
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(json["choices"][0]["message"]["role"], "assistant");
        assert_eq!(
            json["choices"][0]["message"]["content"],
            "![image](https://img/2.png)"
        );
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(
            json["usage"],
            serde_json::json!({"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0})
        );
    }
}
