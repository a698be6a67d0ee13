//! Arrival stream.
//!
//! Keeps at most one pending arrival per sender in a min-heap; popping the
//! globally earliest refills from that sender's remaining list. Ties break
//! on (time, size, receiver, sender), so replay order is stable.

use super::spec::{SenderTrace, TraceMesg};
use crate::error::{SimError, SimResult};
use crate::fabric::HostAddr;
use crate::sim::SimTime;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// One due arrival handed to the scheduler.
// Field order doubles as the derived heap order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Arrival {
    pub at: SimTime,
    pub size_bytes: u64,
    pub dst: HostAddr,
    pub src: HostAddr,
}

#[derive(Debug)]
pub struct TrafficSource {
    // BinaryHeap 是 max-heap；最早到达优先，因此装 Reverse。
    heap: BinaryHeap<Reverse<Arrival>>,
    backlog: HashMap<HostAddr, VecDeque<TraceMesg>>,
    remaining: usize,
}

impl TrafficSource {
    /// Validates each sender block (times finite, non-negative and
    /// non-decreasing; sizes at least one byte; senders unique) and seeds
    /// the heap with one pending arrival per sender.
    pub fn new(senders: Vec<SenderTrace>) -> SimResult<TrafficSource> {
        let mut seen: HashSet<HostAddr> = HashSet::new();
        let mut backlog: HashMap<HostAddr, VecDeque<TraceMesg>> = HashMap::new();
        let mut remaining = 0usize;

        for block in senders {
            let sender = block.sender;
            if !seen.insert(sender) {
                return Err(SimError::InvalidTrace(format!(
                    "duplicate sender block for {sender}"
                )));
            }
            let mut prev: Option<SimTime> = None;
            for (idx, m) in block.messages.iter().enumerate() {
                if !m.arrival_time.is_finite() || m.arrival_time < SimTime::ZERO {
                    return Err(SimError::InvalidTrace(format!(
                        "sender {sender} message #{idx}: arrival_time {} must be finite and non-negative",
                        m.arrival_time.0
                    )));
                }
                if m.size_bytes == 0 {
                    return Err(SimError::InvalidTrace(format!(
                        "sender {sender} message #{idx}: size_bytes must be at least 1"
                    )));
                }
                if let Some(p) = prev {
                    if m.arrival_time < p {
                        return Err(SimError::InvalidTrace(format!(
                            "sender {sender} message #{idx}: arrival times must be non-decreasing"
                        )));
                    }
                }
                prev = Some(m.arrival_time);
            }
            if !block.messages.is_empty() {
                remaining += block.messages.len();
                backlog.insert(sender, block.messages.into());
            }
        }

        let mut source = TrafficSource {
            heap: BinaryHeap::new(),
            backlog,
            remaining,
        };
        let seeded: Vec<HostAddr> = source.backlog.keys().copied().collect();
        for sender in seeded {
            source.refill(sender);
        }
        Ok(source)
    }

    fn refill(&mut self, sender: HostAddr) {
        let Some(queue) = self.backlog.get_mut(&sender) else {
            return;
        };
        if let Some(m) = queue.pop_front() {
            self.heap.push(Reverse(Arrival {
                at: m.arrival_time,
                size_bytes: m.size_bytes,
                dst: m.receiver,
                src: sender,
            }));
        }
        if self.backlog.get(&sender).is_some_and(|q| q.is_empty()) {
            self.backlog.remove(&sender);
        }
    }

    /// Earliest pending arrival time; infinite once the source is drained.
    pub fn peek_due_time(&self) -> SimTime {
        self.heap
            .peek()
            .map(|Reverse(a)| a.at)
            .unwrap_or(SimTime::INFINITY)
    }

    /// Pop the globally earliest arrival and refill its sender.
    pub fn pop_due(&mut self) -> Option<Arrival> {
        let Reverse(arrival) = self.heap.pop()?;
        self.remaining -= 1;
        self.refill(arrival.src);
        Some(arrival)
    }

    /// Messages not yet handed out.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
