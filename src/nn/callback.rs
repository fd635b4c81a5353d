/*
 * @Author       : 老董
 * @Date         : 2026-02-13
 * @Description  : 训练回调与早停
 *
 * 早停状态机：
 *   Improving ──(未提升)──> Plateaued(1) ──> ... ──> Plateaued(patience-1) ──(未提升)──> Stopped
 *       ^                        │
 *       └────────(提升，计数清零)──┘
 */

use serde::{Deserialize, Serialize};

use super::history::{EpochRecord, History};

/// 回调返回值：继续训练或停止
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Continue,
    Stop,
}

/// 训练回调
pub trait Callback {
    fn on_train_begin(&mut self) {}

    /// 每轮结束（已完成验证）后调用
    fn on_epoch_end(&mut self, record: &EpochRecord) -> CallbackAction;

    fn on_train_end(&mut self, _history: &History) {}
}

/// 早停监控的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monitor {
    /// 验证准确率，越大越好
    #[default]
    ValAccuracy,
    /// 验证损失，越小越好
    ValLoss,
}

impl Monitor {
    /// 转换为"越大越好"的分数
    fn score(&self, record: &EpochRecord) -> f32 {
        match self {
            Self::ValAccuracy => record.val_accuracy,
            Self::ValLoss => -record.val_loss,
        }
    }
}

/// 早停状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStoppingState {
    Improving,
    /// 连续未提升的轮数
    Plateaued(usize),
    Stopped,
}

/// 早停：监控指标连续 `patience` 轮没有严格提升时停止训练
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    monitor: Monitor,
    patience: usize,
    min_delta: f32,
    best: f32,
    wait: usize,
    state: EarlyStoppingState,
    stopped_epoch: Option<usize>,
}

impl EarlyStopping {
    /// 监控验证准确率
    pub fn new(patience: usize) -> Self {
        Self {
            monitor: Monitor::ValAccuracy,
            patience,
            min_delta: 0.0,
            best: f32::NEG_INFINITY,
            wait: 0,
            state: EarlyStoppingState::Improving,
            stopped_epoch: None,
        }
    }

    pub fn monitor(mut self, monitor: Monitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// 视为提升所需的最小变化量
    pub fn min_delta(mut self, min_delta: f32) -> Self {
        self.min_delta = min_delta.abs();
        self
    }

    pub fn state(&self) -> EarlyStoppingState {
        self.state
    }

    /// 目前最好的分数（ValLoss 时为损失的相反数）
    pub fn best(&self) -> f32 {
        self.best
    }

    pub fn stopped_epoch(&self) -> Option<usize> {
        self.stopped_epoch
    }

    /// 状态机的一次转移：输入本轮的分数（越大越好）
    pub fn observe(&mut self, score: f32) -> EarlyStoppingState {
        if self.state == EarlyStoppingState::Stopped {
            return self.state;
        }
        if score > self.best + self.min_delta {
            self.best = score;
            self.wait = 0;
            self.state = EarlyStoppingState::Improving;
        } else {
            self.wait += 1;
            self.state = if self.wait >= self.patience {
                EarlyStoppingState::Stopped
            } else {
                EarlyStoppingState::Plateaued(self.wait)
            };
        }
        self.state
    }

    fn reset(&mut self) {
        self.best = f32::NEG_INFINITY;
        self.wait = 0;
        self.state = EarlyStoppingState::Improving;
        self.stopped_epoch = None;
    }
}

impl Callback for EarlyStopping {
    fn on_train_begin(&mut self) {
        self.reset();
    }

    fn on_epoch_end(&mut self, record: &EpochRecord) -> CallbackAction {
        match self.observe(self.monitor.score(record)) {
            EarlyStoppingState::Stopped => {
                self.stopped_epoch = Some(record.epoch);
                tracing::info!(
                    epoch = record.epoch + 1,
                    patience = self.patience,
                    monitor = ?self.monitor,
                    "早停：指标连续未提升"
                );
                CallbackAction::Stop
            }
            EarlyStoppingState::Plateaued(k) => {
                tracing::debug!(epoch = record.epoch + 1, wait = k, "指标未提升");
                CallbackAction::Continue
            }
            EarlyStoppingState::Improving => CallbackAction::Continue,
        }
    }
}
