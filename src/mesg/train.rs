//! Packet trains.
//!
//! One train is one contiguous burst leaving the sender NIC. Entries of
//! `wire_pkts` are per-frame on-wire byte counts; a frame that straddles
//! bursts keeps a single entry, grown as its later bytes go out.

use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct PacketTrain {
    pub tx_start: SimTime,
    pub tx_stop: SimTime,
    /// Message data bytes carried by this train (headers excluded).
    pub data_bytes: u64,
    pub wire_pkts: Vec<u64>,
}

impl PacketTrain {
    pub fn open(tx_start: SimTime) -> PacketTrain {
        PacketTrain {
            tx_start,
            tx_stop: tx_start,
            data_bytes: 0,
            wire_pkts: Vec::new(),
        }
    }

    pub fn wire_bytes(&self) -> u64 {
        self.wire_pkts.iter().sum()
    }

    pub(crate) fn push_pkt(&mut self, wire_bytes: u64) {
        self.wire_pkts.push(wire_bytes);
    }

    pub(crate) fn grow_tail(&mut self, wire_bytes: u64) {
        match self.wire_pkts.last_mut() {
            Some(tail) => *tail += wire_bytes,
            None => self.wire_pkts.push(wire_bytes),
        }
    }
}
