//! Banana API 客户端
//!
//! 负责提交生成任务并轮询任务状态直到结束

use reqwest::{Client, StatusCode};

use super::error::UpstreamError;
use super::headers::build_headers;
use super::model::{GenerateResponse, GenerationPayload, TaskResponse, TaskState, Visibility};
use super::poll::{PollPolicy, PollStep};

/// 上游默认地址
pub const DEFAULT_BASE_URL: &str = "https://banana.listenhub.ai";

/// Banana 图片生成客户端
#[derive(Debug, Clone)]
pub struct BananaClient {
    client: Client,
    base_url: String,
    poll_policy: PollPolicy,
}

impl BananaClient {
    pub fn new(client: Client, base_url: impl Into<String>, poll_policy: PollPolicy) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_policy,
        }
    }

    /// 底层 HTTP 客户端，下载参考图时复用
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll_policy
    }

    /// 生成图片并返回最终图片 URL
    pub async fn generate_image(
        &self,
        payload: GenerationPayload,
        session_token: &str,
    ) -> Result<String, UpstreamError> {
        let task_id = self.submit(payload, session_token).await?;
        tracing::info!(task_id = %task_id, "生成任务已提交，开始轮询");
        self.wait_for_task(&task_id, session_token).await
    }

    /// 提交生成任务，返回 taskId
    ///
    /// 上游返回 500 时切换为 public 可见性重试一次。
    pub async fn submit(
        &self,
        mut payload: GenerationPayload,
        session_token: &str,
    ) -> Result<String, UpstreamError> {
        tracing::info!(payload = %payload.redacted_json(), "上游生成请求");

        let mut response = self.post_generate(&payload, session_token).await?;

        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "上游生成失败，切换为 public 重试");

            payload.visibility = Visibility::Public;
            response = self.post_generate(&payload, session_token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "上游生成失败");
            return Err(UpstreamError::Generate {
                status: status.as_u16(),
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

        Ok(generated.task_id)
    }

    async fn post_generate(
        &self,
        payload: &GenerationPayload,
        session_token: &str,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = format!("{}/api/images/generate", self.base_url);
        let headers = build_headers(&self.base_url, session_token, true)?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(payload)
            .send()
            .await?;

        Ok(response)
    }

    /// 按轮询策略等待任务结束
    pub async fn wait_for_task(
        &self,
        task_id: &str,
        session_token: &str,
    ) -> Result<String, UpstreamError> {
        self.poll_policy
            .run(|_| self.check_task(task_id, session_token))
            .await
    }

    /// 查询一次任务状态
    async fn check_task(
        &self,
        task_id: &str,
        session_token: &str,
    ) -> Result<PollStep<String>, UpstreamError> {
        let url = format!(
            "{}/api/images/{}",
            self.base_url,
            urlencoding::encode(task_id)
        );
        let headers = build_headers(&self.base_url, session_token, false)?;

        let response = self.client.get(&url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "任务查询失败");
            return Err(UpstreamError::Poll {
                status: status.as_u16(),
            });
        }

        let data: TaskResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

        match data.task.state {
            TaskState::Completed => data
                .task
                .result
                .and_then(|r| r.image_url)
                .map(PollStep::Ready)
                .ok_or_else(|| {
                    UpstreamError::InvalidResponse("completed task without imageUrl".to_string())
                }),
            TaskState::Failed => {
                let message = data.task.failure_message();
                tracing::error!(task_id = %task_id, error = %message, "任务失败");
                Err(UpstreamError::TaskFailed(message))
            }
            TaskState::Pending | TaskState::Unknown => Ok(PollStep::Pending),
        }
    }
}
