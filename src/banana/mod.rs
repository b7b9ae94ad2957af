//! Banana 图片生成上游模块
//!
//! 提交异步生成任务并轮询结果

pub mod client;
pub mod error;
pub mod headers;
pub mod model;
pub mod poll;
