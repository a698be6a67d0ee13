//! Fabric parameters.
//!
//! Loaded once per run and never mutated afterwards. Field names carry the
//! unit suffix; all delays are seconds, all rates Gbit/s.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    /// Host NIC / edge link rate.
    pub nic_link_speed_gbps: f64,
    /// Fabric (aggregation/core) link rate.
    pub fabric_link_speed_gbps: f64,
    /// Propagation delay of one edge link.
    pub edge_link_delay_s: f64,
    /// Propagation delay of one fabric link.
    pub fabric_link_delay_s: f64,
    /// Fixed per-switch processing delay.
    pub switch_fix_delay_s: f64,
    /// Host software turnaround, charged once per direction.
    pub host_sw_turnaround_s: f64,
    /// Receiving NIC think time, charged once per delivery.
    pub host_nic_think_time_s: f64,
    /// Cut-through switching: serialization only at the points that remain.
    pub cut_through: bool,
    pub num_tors: u32,
    pub servers_per_tor: u32,
}

impl Default for Topology {
    fn default() -> Self {
        Topology {
            nic_link_speed_gbps: 10.0,
            fabric_link_speed_gbps: 40.0,
            edge_link_delay_s: 0.3e-6,
            fabric_link_delay_s: 0.3e-6,
            switch_fix_delay_s: 0.25e-6,
            host_sw_turnaround_s: 0.5e-6,
            host_nic_think_time_s: 0.5e-6,
            cut_through: false,
            num_tors: 9,
            servers_per_tor: 16,
        }
    }
}

impl Topology {
    pub fn nic_bps(&self) -> f64 {
        self.nic_link_speed_gbps * 1e9
    }

    pub fn fabric_bps(&self) -> f64 {
        self.fabric_link_speed_gbps * 1e9
    }

    pub fn num_hosts(&self) -> usize {
        self.num_tors as usize * self.servers_per_tor as usize
    }

    pub fn validate(&self) -> SimResult<()> {
        for (name, v) in [
            ("nic_link_speed_gbps", self.nic_link_speed_gbps),
            ("fabric_link_speed_gbps", self.fabric_link_speed_gbps),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SimError::InvalidTopology(format!(
                    "{name} must be positive and finite, got {v}"
                )));
            }
        }
        for (name, v) in [
            ("edge_link_delay_s", self.edge_link_delay_s),
            ("fabric_link_delay_s", self.fabric_link_delay_s),
            ("switch_fix_delay_s", self.switch_fix_delay_s),
            ("host_sw_turnaround_s", self.host_sw_turnaround_s),
            ("host_nic_think_time_s", self.host_nic_think_time_s),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SimError::InvalidTopology(format!(
                    "{name} must be non-negative and finite, got {v}"
                )));
            }
        }
        if self.num_tors == 0 || self.servers_per_tor == 0 {
            return Err(SimError::InvalidTopology(
                "num_tors and servers_per_tor must both be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
