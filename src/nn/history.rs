//! 逐轮训练记录

use serde::{Deserialize, Serialize};

/// 单轮训练结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 轮次（从 0 开始）
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
    pub val_loss: f32,
    pub val_accuracy: f32,
}

/// 训练历史：实际跑过的每一轮一条记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    records: Vec<EpochRecord>,
    /// 早停发生的轮次（从 0 开始）；跑满全部轮次时为 None
    stopped_epoch: Option<usize>,
}

impl History {
    pub fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    pub fn stopped_epoch(&self) -> Option<usize> {
        self.stopped_epoch
    }

    pub fn set_stopped_epoch(&mut self, epoch: Option<usize>) {
        self.stopped_epoch = epoch;
    }

    pub fn loss(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.loss).collect()
    }

    pub fn accuracy(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.accuracy).collect()
    }

    pub fn val_loss(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.val_loss).collect()
    }

    pub fn val_accuracy(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.val_accuracy).collect()
    }

    /// 验证准确率最高的一轮
    pub fn best_val_accuracy(&self) -> Option<&EpochRecord> {
        self.records
            .iter()
            .fold(None, |best: Option<&EpochRecord>, r| match best {
                Some(b) if b.val_accuracy >= r.val_accuracy => Some(b),
                _ => Some(r),
            })
    }
}
