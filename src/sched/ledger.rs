//! Receiver activity ledger.
//!
//! Tracks, per receiver, the maximal periods during which at least one
//! inbound message is incomplete. A period opens at a message creation,
//! is stretched by completion times (which may land past the current
//! clock), and is banked once the incomplete count is back at zero and a
//! later creation starts beyond its stop.

use super::record::ReceiverSummary;
use crate::error::{SimError, SimResult};
use crate::fabric::HostAddr;
use crate::sim::SimTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct ActivePeriod {
    start: SimTime,
    stop: SimTime,
}

#[derive(Debug, Default)]
struct ReceiverState {
    incomplete: usize,
    bytes_received: u64,
    active_total: f64,
    open: Option<ActivePeriod>,
}

#[derive(Debug, Default)]
pub struct ReceiverLedger {
    receivers: HashMap<HostAddr, ReceiverState>,
}

impl ReceiverLedger {
    pub fn on_mesg_created(&mut self, receiver: HostAddr, at: SimTime) {
        let state = self.receivers.entry(receiver).or_default();
        match &mut state.open {
            Some(period) if state.incomplete == 0 && at > period.stop => {
                // The previous period lapsed; bank it and start a new one.
                state.active_total += period.stop.0 - period.start.0;
                state.open = Some(ActivePeriod {
                    start: at,
                    stop: at,
                });
            }
            Some(_) => {}
            None => {
                state.open = Some(ActivePeriod {
                    start: at,
                    stop: at,
                });
            }
        }
        state.incomplete += 1;
    }

    pub fn on_mesg_completed(
        &mut self,
        receiver: HostAddr,
        recv_time: SimTime,
        data_bytes: u64,
    ) -> SimResult<()> {
        let Some(state) = self.receivers.get_mut(&receiver) else {
            return Err(SimError::invariant(format!(
                "completion for unknown receiver {receiver}"
            )));
        };
        if state.incomplete == 0 || state.open.is_none() {
            return Err(SimError::invariant(format!(
                "receiver {receiver} completed a message outside an active period"
            )));
        }
        state.incomplete -= 1;
        state.bytes_received += data_bytes;
        if let Some(period) = &mut state.open {
            period.stop = period.stop.max(recv_time);
        }
        Ok(())
    }

    /// Bank any still-open periods. Call once, after the last completion.
    pub fn finish(&mut self) {
        for state in self.receivers.values_mut() {
            if let Some(period) = state.open.take() {
                state.active_total += period.stop.0 - period.start.0;
            }
        }
    }

    /// Summaries sorted by receiver address.
    pub fn summaries(&self, nic_bps: f64) -> Vec<ReceiverSummary> {
        let mut out: Vec<ReceiverSummary> = self
            .receivers
            .iter()
            .map(|(addr, state)| {
                let active = state.active_total;
                let busy = state.bytes_received as f64 * 8.0 / nic_bps;
                let wasted = if active > 0.0 {
                    ((active - busy) / active).max(0.0)
                } else {
                    0.0
                };
                ReceiverSummary {
                    receiver: *addr,
                    bytes_received: state.bytes_received,
                    active_time: active,
                    wasted_fraction: wasted,
                }
            })
            .collect();
        out.sort_by_key(|s| s.receiver);
        out
    }
}
