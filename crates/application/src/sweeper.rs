//! 超时清理任务
//!
//! 独立于请求处理周期性运行，只通过注册表（进而通过存储）与系统其余部分交互。
//! 单个参与者清理失败只记录并计数，不影响同一轮的其他参与者，也不会终止后续轮次。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{
    clock::{to_time_duration, Clock},
    error::ApplicationError,
    presence::PresenceRegistry,
};

/// 单轮清理结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub evicted: usize,
    pub failed: usize,
}

pub struct EvictionSweeper {
    registry: Arc<PresenceRegistry>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl EvictionSweeper {
    pub fn new(registry: Arc<PresenceRegistry>, clock: Arc<dyn Clock>) -> Self {
        let interval = registry.settings().sweep_interval;
        Self {
            registry,
            clock,
            interval,
        }
    }

    /// 执行一轮清理。`now` 每轮只读取一次，保证同一轮内的过期边界一致。
    pub async fn sweep_once(&self) -> Result<SweepReport, ApplicationError> {
        let now = self.clock.now();
        let threshold = to_time_duration(self.registry.settings().inactivity_threshold);
        let participants = self.registry.list().await?;

        let mut report = SweepReport {
            scanned: participants.len(),
            ..SweepReport::default()
        };

        for participant in participants
            .into_iter()
            .filter(|p| p.is_stale(now, threshold))
        {
            match self.registry.evict_if_stale(&participant.name, now).await {
                Ok(true) => report.evicted += 1,
                Ok(false) => {}
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        participant = %participant.name,
                        error = %err,
                        "清理过期参与者失败"
                    );
                }
            }
        }

        Ok(report)
    }

    /// 按固定间隔循环清理，直到收到关闭信号。
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval 的第一次 tick 立即返回，先消耗掉，第一轮在一个周期之后执行
        interval.tick().await;

        tracing::info!(interval = ?self.interval, "超时清理任务已启动");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sweep_once().await {
                        Ok(report) if report.evicted > 0 || report.failed > 0 => {
                            tracing::info!(
                                scanned = report.scanned,
                                evicted = report.evicted,
                                failed = report.failed,
                                "完成一轮超时清理"
                            );
                        }
                        Ok(report) => {
                            tracing::debug!(scanned = report.scanned, "完成一轮超时清理");
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "超时清理失败，等待下一轮");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("超时清理任务已停止");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
