//! OpenAI API Handler 函数

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Extension,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use futures::stream;
use tracing::Instrument;
use uuid::Uuid;

use crate::banana::client::BananaClient;
use crate::banana::error::{TIMEOUT_MESSAGE, UpstreamError};
use crate::banana::model::{ASPECT_RATIOS, SIZES};
use crate::common::auth::SessionToken;

use super::converter::{ConversionError, convert_request};
use super::stream::StreamContext;
use super::types::{ChatCompletionRequest, DEFAULT_MODEL, ErrorResponse, Model, ModelList};

/// 模型列表中的固定创建时间
const MODEL_CREATED: i64 = 1677610602;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub banana: Arc<BananaClient>,
}

impl AppState {
    pub fn new(banana: BananaClient) -> Self {
        Self {
            banana: Arc::new(banana),
        }
    }
}

/// 请求处理错误
#[derive(Debug)]
pub enum HandlerError {
    /// JSON 合法但结构不符合 Chat Completions 请求
    InvalidRequest(serde_json::Error),
    Conversion(ConversionError),
    Upstream(UpstreamError),
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::InvalidRequest(e) => write!(f, "{}", e),
            HandlerError::Conversion(e) => write!(f, "{}", e),
            HandlerError::Upstream(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<ConversionError> for HandlerError {
    fn from(e: ConversionError) -> Self {
        HandlerError::Conversion(e)
    }
}

impl From<UpstreamError> for HandlerError {
    fn from(e: UpstreamError) -> Self {
        HandlerError::Upstream(e)
    }
}

/// 构建错误响应
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message, status.as_u16()))).into_response()
}

/// 将处理错误映射为 HTTP 响应
///
/// 生成接口失败时透传上游状态码，超时使用固定消息，其余一律 500。
pub fn error_response_for(err: &HandlerError) -> Response {
    match err {
        HandlerError::Upstream(e @ UpstreamError::Generate { .. }) => error_response(
            e.status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "Upstream request failed",
        ),
        HandlerError::Upstream(UpstreamError::Timeout) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, TIMEOUT_MESSAGE)
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// GET /v1/models
///
/// 尺寸 × 宽高比的全部组合
pub async fn list_models() -> Json<ModelList> {
    let data = SIZES
        .iter()
        .flat_map(|size| {
            ASPECT_RATIOS.iter().map(move |ratio| Model {
                id: format!("{}-{}-{}", DEFAULT_MODEL, size, ratio),
                object: "model".to_string(),
                created: MODEL_CREATED,
                owned_by: "banana".to_string(),
            })
        })
        .collect();

    Json(ModelList {
        object: "list".to_string(),
        data,
    })
}

/// POST /v1/chat/completions
///
/// OpenAI 兼容的聊天完成端点，返回生成图片的 markdown
pub async fn chat_completions(
    State(state): State<AppState>,
    Extension(SessionToken(session_token)): Extension<SessionToken>,
    body: Bytes,
) -> Response {
    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("请求体不是合法 JSON: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let span = tracing::info_span!("chat_completions", request_id = %Uuid::new_v4());

    async move {
        match generate(&state, value, &session_token).await {
            Ok((payload, image_url)) => {
                let ctx = StreamContext::new(payload.model_or_default());
                tracing::info!(image_url = %image_url, stream = payload.is_stream(), "图片生成完成");
                if payload.is_stream() {
                    stream_response(&ctx, &image_url)
                } else {
                    (StatusCode::OK, Json(ctx.completion(&image_url))).into_response()
                }
            }
            Err(e) => {
                tracing::error!("请求处理失败: {}", e);
                error_response_for(&e)
            }
        }
    }
    .instrument(span)
    .await
}

/// 解析请求、调用上游并返回图片 URL
async fn generate(
    state: &AppState,
    value: serde_json::Value,
    session_token: &str,
) -> Result<(ChatCompletionRequest, String), HandlerError> {
    let payload: ChatCompletionRequest =
        serde_json::from_value(value).map_err(HandlerError::InvalidRequest)?;

    tracing::info!(
        model = %payload.model_or_default(),
        stream = %payload.is_stream(),
        message_count = %payload.messages.len(),
        "Received POST /v1/chat/completions request"
    );

    let conversion = convert_request(&payload, state.banana.http()).await?;
    tracing::debug!(model = %conversion.original_model, "请求转换完成");

    let image_url = state
        .banana
        .generate_image(conversion.payload, session_token)
        .await?;

    Ok((payload, image_url))
}

/// 构建 SSE 响应
fn stream_response(ctx: &StreamContext, image_url: &str) -> Response {
    let frames = ctx
        .sse_frames(image_url)
        .into_iter()
        .map(|frame| Ok::<_, Infallible>(Bytes::from(frame)));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream::iter(frames)),
    )
        .into_response()
}

/// 未匹配的路径或方法
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_models() {
        let Json(list) = list_models().await;
        assert_eq!(list.object, "list");
        assert_eq!(list.data.len(), 15);
        assert_eq!(list.data[0].id, "gemini-3-pro-image-preview-1k-1:1");
        assert_eq!(list.data[14].id, "gemini-3-pro-image-preview-4k-3:4");
        assert!(list.data.iter().all(|m| m.owned_by == "banana"));
    }

    #[test]
    fn test_error_mapping() {
        let resp = error_response_for(&HandlerError::Upstream(UpstreamError::Generate {
            status: 429,
        }));
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let resp = error_response_for(&HandlerError::Upstream(UpstreamError::Timeout));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = error_response_for(&HandlerError::Conversion(
            ConversionError::LastMessageNotUser,
        ));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = error_response_for(&HandlerError::Upstream(UpstreamError::Poll {
            status: 502,
        }));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
