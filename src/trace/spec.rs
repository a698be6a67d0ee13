//! Trace input spec.
//!
//! The JSON shape a run consumes: fabric parameters plus one block of
//! time-ordered messages per sender.

use crate::fabric::{HostAddr, Topology};
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSpec {
    #[serde(default)]
    pub topology: Topology,
    pub senders: Vec<SenderTrace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderTrace {
    pub sender: HostAddr,
    #[serde(default)]
    pub messages: Vec<TraceMesg>,
}

/// One injected message. `arrival_time` is seconds on the simulated clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMesg {
    pub arrival_time: SimTime,
    pub size_bytes: u64,
    pub receiver: HostAddr,
}
