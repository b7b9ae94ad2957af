//! OpenAI 兼容 API 模块
//!
//! 提供 OpenAI Chat Completions API 兼容接口，
//! 将 OpenAI 格式请求转换为 Banana 图片生成任务。

mod converter;
mod handlers;
mod router;
mod stream;
mod types;

pub use router::create_router;
