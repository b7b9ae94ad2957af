//! 任务轮询策略
//!
//! 固定初始延迟 + 固定间隔的有界轮询，不做指数退避：
//! 上游任务耗时大致均匀且有上限。

use std::future::Future;
use std::time::Duration;

use super::error::UpstreamError;

/// 默认初始延迟（秒）
pub const DEFAULT_INITIAL_DELAY_SECS: u64 = 10;
/// 默认轮询间隔（秒）
pub const DEFAULT_INTERVAL_SECS: u64 = 3;
/// 默认最大轮询次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// 单次轮询结果
#[derive(Debug, PartialEq, Eq)]
pub enum PollStep<T> {
    /// 任务已结束
    Ready(T),
    /// 任务仍在进行
    Pending,
}

/// 轮询策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(DEFAULT_INITIAL_DELAY_SECS),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// 最坏情况下的总等待时间（不含网络耗时）
    pub fn budget(&self) -> Duration {
        self.initial_delay + self.interval * self.max_attempts
    }

    /// 执行轮询
    ///
    /// 先等待 `initial_delay`，然后最多调用 `attempt` `max_attempts` 次，
    /// 每次 `Pending` 后等待 `interval`。`attempt` 返回的错误立即终止轮询。
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, UpstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PollStep<T>, UpstreamError>>,
    {
        tokio::time::sleep(self.initial_delay).await;

        for i in 0..self.max_attempts {
            match attempt(i).await? {
                PollStep::Ready(value) => return Ok(value),
                PollStep::Pending => {
                    tracing::trace!(attempt = i + 1, max = self.max_attempts, "任务仍在进行");
                    tokio::time::sleep(self.interval).await;
                }
            }
        }

        Err(UpstreamError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_secs(1),
            "elapsed {:?}, expected {:?}",
            elapsed,
            expected
        );
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(PollPolicy::default().budget(), Duration::from_secs(190));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_ready() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result = PollPolicy::default()
            .run(|i| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if i == 2 {
                        Ok(PollStep::Ready("done"))
                    } else {
                        Ok(PollStep::Pending)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_elapsed(start, Duration::from_secs(10 + 2 * 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = PollPolicy::default()
            .run(|_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(UpstreamError::TaskFailed("boom".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(UpstreamError::TaskFailed(ref m)) if m == "boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result: Result<(), _> = PollPolicy::default()
            .run(|_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(PollStep::Pending) }
            })
            .await;

        assert!(matches!(result, Err(UpstreamError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 60);
        assert_elapsed(start, Duration::from_secs(190));
    }
}
