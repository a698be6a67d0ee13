//! 错误类型
//!
//! 仿真器内部的错误分类。输入耗尽不是错误（由 `Option`/空状态表达），
//! 任何不变量被破坏都视为致命错误，立即终止本次仿真。

use crate::mesg::MsgId;
use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// 拓扑参数非法，或一对地址不符合 network.pod.tor.server 编址约定。
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// 输入 trace 非法（乱序到达、0 字节消息、重复 sender 等）。
    #[error("invalid trace: {0}")]
    InvalidTrace(String),

    /// 仿真不变量被破坏（字节守恒、时间单调性、首 bit 早于发送等）。
    #[error("invariant violation{}: {detail}", fmt_mesg(.mesg))]
    InvariantViolation {
        mesg: Option<MsgId>,
        detail: String,
    },
}

impl SimError {
    pub fn invariant(detail: impl Into<String>) -> SimError {
        SimError::InvariantViolation {
            mesg: None,
            detail: detail.into(),
        }
    }

    /// 给错误补上出错消息的 id（已有 id 时保留原值）。
    pub fn for_mesg(self, id: MsgId) -> SimError {
        match self {
            SimError::InvariantViolation { mesg: None, detail } => SimError::InvariantViolation {
                mesg: Some(id),
                detail,
            },
            other => other,
        }
    }
}

fn fmt_mesg(mesg: &Option<MsgId>) -> String {
    match mesg {
        Some(id) => format!(" (mesg {})", id.0),
        None => String::new(),
    }
}
