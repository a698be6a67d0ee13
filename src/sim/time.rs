//! 仿真时间类型
//!
//! 定义仿真时间（秒，f64）。延迟模型与输入 trace 都是浮点秒，
//! 因此这里不用整数纳秒；通过 `total_cmp` 提供全序，保证回放确定性。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 仿真时间（秒）。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);
    /// 事件源耗尽时的“下一到达时间”。
    pub const INFINITY: SimTime = SimTime(f64::INFINITY);

    pub fn from_micros(us: f64) -> SimTime {
        SimTime(us * 1e-6)
    }
    pub fn from_millis(ms: f64) -> SimTime {
        SimTime(ms * 1e-3)
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

// f64 本身不是全序（NaN）；仿真时钟要求可排序，统一用 total_cmp。
impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
