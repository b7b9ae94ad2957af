//! 服务配置
//!
//! JSON 配置文件（camelCase），所有字段均有默认值

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::banana::client::DEFAULT_BASE_URL;
use crate::banana::poll::{
    DEFAULT_INITIAL_DELAY_SECS, DEFAULT_INTERVAL_SECS, DEFAULT_MAX_ATTEMPTS, PollPolicy,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// 上游站点地址，同时用作 Origin / Referer
    pub upstream_base_url: String,
    /// 单次上游 HTTP 请求超时
    pub request_timeout_secs: u64,
    /// 可选代理，支持 http/https/socks5
    pub proxy_url: Option<String>,
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8990,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
            proxy_url: None,
            poll: PollConfig::default(),
        }
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            interval: Duration::from_secs(self.interval_secs),
            max_attempts: self.max_attempts,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        if config.poll.max_attempts == 0 {
            anyhow::bail!("poll.maxAttempts 必须大于 0");
        }
        Ok(config)
    }

    /// 构建上游 HTTP 客户端
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(self.request_timeout_secs));

        if let Some(proxy_url) = &self.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .with_context(|| format!("无效的代理地址: {}", proxy_url))?;
            builder = builder.proxy(proxy);
        }

        builder.build().context("创建 HTTP 客户端失败")
    }
}
