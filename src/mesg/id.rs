//! 消息标识

use serde::{Deserialize, Serialize};

/// 全局递增的消息 id。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgId(pub u64);
