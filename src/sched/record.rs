//! Run outputs.
//!
//! Completion records are the primary product: one JSON-ready row per
//! message, stamped when its reception is finalized.

use crate::fabric::HostAddr;
use crate::mesg::MsgId;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

/// Per-message outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub size: u64,
    pub creation_time: SimTime,
    pub completion_time: SimTime,
    /// Realized completion over the contention-free minimum; 1.0 is optimal.
    pub stretch: f64,
    pub id: MsgId,
    pub sender: HostAddr,
    pub receiver: HostAddr,
}

/// Per-receiver activity summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverSummary {
    pub receiver: HostAddr,
    pub bytes_received: u64,
    /// Total time with at least one incomplete inbound message (seconds).
    pub active_time: f64,
    /// Share of active time the NIC spent not serializing received data.
    pub wasted_fraction: f64,
}

/// Everything a finished run reports.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub records: Vec<CompletionRecord>,
    pub receivers: Vec<ReceiverSummary>,
    pub rounds: u64,
    pub final_time: SimTime,
}
