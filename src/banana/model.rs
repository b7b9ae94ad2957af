//! Banana 图片生成 API 数据模型
//!
//! 生成请求体与任务状态响应的类型定义

use serde::{Deserialize, Serialize};

/// 支持的尺寸（模型名中的小写 token）
pub const SIZES: [&str; 3] = ["1k", "2k", "4k"];

/// 支持的宽高比
pub const ASPECT_RATIOS: [&str; 5] = ["1:1", "16:9", "9:16", "4:3", "3:4"];

/// 默认尺寸
pub const DEFAULT_SIZE: &str = "2k";

/// 默认宽高比
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// 生成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// 文生图
    T2i,
    /// 图片编辑（带参考图）
    Edit,
}

/// 任务可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

/// 生成参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParams {
    /// 大写尺寸，如 `2K`
    pub size: String,
    pub aspect_ratio: String,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE.to_uppercase(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }
}

/// `POST /api/images/generate` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub prompt: String,
    pub mode: GenerationMode,
    pub visibility: Visibility,
    pub params: ModelParams,
    /// base64 data URI 列表，仅 edit 模式存在
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl GenerationPayload {
    /// 创建生成请求，mode 由是否带图片决定，可见性初始为 private
    pub fn new(prompt: impl Into<String>, params: ModelParams, images: Vec<String>) -> Self {
        let mode = if images.is_empty() {
            GenerationMode::T2i
        } else {
            GenerationMode::Edit
        };

        Self {
            prompt: prompt.into(),
            mode,
            visibility: Visibility::Private,
            params,
            images,
        }
    }

    /// 用于日志输出的 JSON，图片内容被省略
    pub fn redacted_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "prompt": self.prompt,
            "mode": self.mode,
            "visibility": self.visibility,
            "params": self.params,
        });
        if !self.images.is_empty() {
            value["images"] = serde_json::Value::String(format!(
                "[{} images, base64 omitted]",
                self.images.len()
            ));
        }
        value
    }
}

/// 生成接口响应
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub task_id: String,
}

/// 任务查询响应
#[derive(Debug, Deserialize)]
pub struct TaskResponse {
    pub task: Task,
}

/// 上游任务
#[derive(Debug, Deserialize)]
pub struct Task {
    /// 缺失时视为进行中
    #[serde(default)]
    pub state: TaskState,
    #[serde(default)]
    pub result: Option<TaskResult>,
    /// 上游错误信息，类型不固定，只在任务失败时读取
    #[serde(default)]
    pub error: serde_json::Value,
}

impl Task {
    /// 失败任务的错误消息，缺失或为空时使用通用消息
    pub fn failure_message(&self) -> String {
        match &self.error {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
        .unwrap_or_else(|| "Task failed".to_string())
    }
}

/// 任务状态，未知状态视为进行中
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    #[serde(default)]
    pub image_url: Option<String>,
}
