//! 并发限制器 - 基础设施层
//!
//! 持有全局唯一的并发槽位（Semaphore），只暴露"在槽位内执行任务"的能力。
//!
//! - 同时运行的任务数不超过 `max_parallel`
//! - 超出的任务挂起等待，大致按 FIFO 获得槽位
//! - 等待期间收到取消信号时直接返回，不启动任务
//! - 槽位通过 `OwnedSemaphorePermit` 的 drop 释放，任务成功、失败、panic 或被丢弃都会归还

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 等待槽位期间被取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("等待执行槽位时请求被取消")]
pub struct LimiterCancelled;

/// 并发限制器
///
/// clone 之后共享同一组槽位。
#[derive(Debug, Clone)]
pub struct TaskLimiter {
    semaphore: Arc<Semaphore>,
    max_parallel: usize,
}

impl TaskLimiter {
    /// 创建新的限制器，`max_parallel` 为 0 时按 1 处理
    pub fn new(max_parallel: usize) -> Self {
        let max_parallel = if max_parallel == 0 {
            warn!("⚠️ 最大并发数为 0，已调整为 1");
            1
        } else {
            max_parallel
        };

        Self {
            semaphore: Arc::new(Semaphore::new(max_parallel)),
            max_parallel,
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// 当前空闲的槽位数
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 在一个槽位内执行任务
    ///
    /// `task` 只有在拿到槽位之后才会被调用。
    pub async fn exec<F, Fut, T>(
        &self,
        task: F,
        cancel: &CancellationToken,
    ) -> Result<T, LimiterCancelled>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("等待槽位时收到取消信号");
                return Err(LimiterCancelled);
            }
            permit = self.semaphore.clone().acquire_owned() => {
                // semaphore 从不 close，这里的错误分支只在理论上存在
                permit.map_err(|_| LimiterCancelled)?
            }
        };

        let _permit = permit;
        Ok(task().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_max_parallel() {
        let limiter = TaskLimiter::new(2);
        let cancel = CancellationToken::new();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|i| {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                limiter
                    .exec(
                        move || async move {
                            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            in_flight.fetch_sub(1, Ordering::SeqCst);
                            i
                        },
                        &cancel,
                    )
                    .await
            }
        });

        let results = futures::future::join_all(tasks).await;

        assert_eq!(results.len(), 8);
        for (i, r) in results.into_iter().enumerate() {
            assert_eq!(r, Ok(i));
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(limiter.available_slots(), 2);
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_does_not_start_task() {
        let limiter = TaskLimiter::new(1);
        let cancel = CancellationToken::new();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let holder = {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                limiter
                    .exec(
                        || async move {
                            let _ = release_rx.await;
                        },
                        &cancel,
                    )
                    .await
            })
        };

        while limiter.available_slots() != 0 {
            tokio::task::yield_now().await;
        }

        let waiting_cancel = CancellationToken::new();
        let started = Arc::new(AtomicUsize::new(0));
        let waiter = {
            let limiter = limiter.clone();
            let waiting_cancel = waiting_cancel.clone();
            let started = started.clone();
            tokio::spawn(async move {
                limiter
                    .exec(
                        || async move {
                            started.fetch_add(1, Ordering::SeqCst);
                        },
                        &waiting_cancel,
                    )
                    .await
            })
        };

        waiting_cancel.cancel();
        assert_eq!(waiter.await.unwrap(), Err(LimiterCancelled));
        assert_eq!(started.load(Ordering::SeqCst), 0);

        release_tx.send(()).unwrap();
        assert!(holder.await.unwrap().is_ok());
        assert_eq!(limiter.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_slot_released_after_panic() {
        let limiter = TaskLimiter::new(1);

        let handle = {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let cancel = CancellationToken::new();
                limiter
                    .exec(|| async { panic!("task failed"); }, &cancel)
                    .await
            })
        };

        assert!(handle.await.is_err());
        assert_eq!(limiter.available_slots(), 1);
    }

    #[test]
    fn test_zero_is_clamped_to_one() {
        assert_eq!(TaskLimiter::new(0).max_parallel(), 1);
    }
}
