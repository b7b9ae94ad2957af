//! OpenAI → Banana 协议转换器
//!
//! 负责将 OpenAI Chat Completions API 请求格式转换为 Banana 生成请求

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::try_join_all;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::banana::model::{
    ASPECT_RATIOS, DEFAULT_ASPECT_RATIO, DEFAULT_SIZE, GenerationPayload, ModelParams, SIZES,
};

use super::types::{ChatCompletionRequest, ChatMessage, ContentPart, MessageContent};

/// 下载的图片没有 Content-Type 时使用的类型
const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/png";

/// 从模型名解析尺寸和宽高比
///
/// 模型名按 `-` 分割，逐个匹配；同类 token 出现多次时以最后一个为准，
/// 无法识别的 token 直接忽略。
///
/// - `gemini-3-pro-image-preview-1k-9:16` → `1K` / `9:16`
/// - `gemini-3-pro-image-preview` → `2K` / `16:9`
pub fn parse_model_params(model: &str) -> ModelParams {
    let mut size = DEFAULT_SIZE;
    let mut aspect_ratio = DEFAULT_ASPECT_RATIO;

    for part in model.split('-') {
        if SIZES.contains(&part) {
            size = part;
        } else if ASPECT_RATIOS.contains(&part) {
            aspect_ratio = part;
        }
    }

    ModelParams {
        size: size.to_uppercase(),
        aspect_ratio: aspect_ratio.to_string(),
    }
}

/// 最后一条用户消息的内容
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UserContent {
    pub text: String,
    /// 图片 URL 或 data URI，保持原始顺序
    pub images: Vec<String>,
}

/// 转换结果
#[derive(Debug)]
pub struct ConversionResult {
    /// 上游生成请求
    pub payload: GenerationPayload,
    /// 原始模型名（用于响应）
    pub original_model: String,
}

/// 转换错误
#[derive(Debug)]
pub enum ConversionError {
    EmptyMessages,
    LastMessageNotUser,
    ImageFetch(reqwest::Error),
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::EmptyMessages => write!(f, "Messages must not be empty"),
            ConversionError::LastMessageNotUser => write!(f, "Last message must be from user"),
            ConversionError::ImageFetch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConversionError::ImageFetch(e) => Some(e),
            _ => None,
        }
    }
}

/// 提取最后一条消息的文本和图片
///
/// 最后一条消息必须来自 user。多个 text 部分时取最后一个，
/// image_url 部分全部按顺序收集。
pub fn extract_user_content(messages: &[ChatMessage]) -> Result<UserContent, ConversionError> {
    let last = messages.last().ok_or(ConversionError::EmptyMessages)?;
    if last.role != "user" {
        return Err(ConversionError::LastMessageNotUser);
    }

    let mut content = UserContent::default();

    match &last.content {
        Some(MessageContent::Text(s)) => content.text = s.clone(),
        Some(MessageContent::Parts(parts)) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => content.text = text.clone(),
                    ContentPart::ImageUrl { image_url } => {
                        content.images.push(image_url.url.clone())
                    }
                    ContentPart::Other => {}
                }
            }
        }
        None => {}
    }

    Ok(content)
}

/// 将图片 URL 转为 base64 data URI
///
/// 已经是 data URI 时原样返回。
pub async fn url_to_base64(client: &Client, url: &str) -> Result<String, ConversionError> {
    if url.starts_with("data:") {
        return Ok(url.to_string());
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(ConversionError::ImageFetch)?;

    if !response.status().is_success() {
        tracing::warn!(url = %url, status = response.status().as_u16(), "下载图片返回非成功状态");
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
        .to_string();

    let bytes = response.bytes().await.map_err(ConversionError::ImageFetch)?;

    Ok(format!("data:{};base64,{}", content_type, STANDARD.encode(&bytes)))
}

/// 将 OpenAI 请求转换为 Banana 生成请求
///
/// 带图片时并发下载所有参考图，结果保持原始顺序。
pub async fn convert_request(
    req: &ChatCompletionRequest,
    client: &Client,
) -> Result<ConversionResult, ConversionError> {
    // 1. 提取用户内容（失败时不会发出任何上游请求）
    let content = extract_user_content(&req.messages)?;

    // 2. 解析模型参数
    let model = req.model_or_default();
    let params = parse_model_params(model);

    // 3. 下载并编码参考图
    let images = try_join_all(content.images.iter().map(|url| url_to_base64(client, url))).await?;

    Ok(ConversionResult {
        payload: GenerationPayload::new(content.text, params, images),
        original_model: model.to_string(),
    })
}
