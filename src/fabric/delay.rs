//! 传输路径延迟模型
//!
//! 按地址对的拓扑关系选出逐跳串行化速率与一次性固定延迟，再用流水线
//! 填充递推算出一车帧在接收端的到达时刻：
//!
//!   A[n][k] = bytes[n]·8/speed[k] + max(A[n][k-1], A[n-1][k])
//!
//! 边界 A[n][-1] = tx_start（发送端按线速喂入），A[-1][k] = tx_start，
//! 或者延用上一车各跳的出口时刻（同一消息的车与车之间流水线不清空）。
//! 递推只需滚动保存一行。

use super::addr::HostAddr;
use super::topology::Topology;
use crate::error::{SimError, SimResult};
use crate::sim::SimTime;
use tracing::trace;

/// 一对地址在拓扑中的关系。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopClass {
    Loopback,
    SameRack,
    SamePod,
    CrossPod,
}

/// 地址对判定。只比较对应字节，顺序固定：ToR 字节相同即同机架，
/// 其次比较 pod 字节，再次网络字节；网络字节也不同则编址非法。
pub fn classify(src: HostAddr, dst: HostAddr) -> SimResult<HopClass> {
    if src == dst {
        return Ok(HopClass::Loopback);
    }
    if src.tor() == dst.tor() {
        Ok(HopClass::SameRack)
    } else if src.pod() == dst.pod() {
        Ok(HopClass::SamePod)
    } else if src.net() == dst.net() {
        Ok(HopClass::CrossPod)
    } else {
        Err(SimError::InvalidTopology(format!(
            "address pair {src} -> {dst} does not follow the network.pod.tor.server convention"
        )))
    }
}

/// 一车帧的送达结果。
#[derive(Debug, Clone)]
pub struct Delivery {
    /// 每帧最后一跳的到达时刻（不含固定延迟）。
    pub pkt_arrivals: Vec<SimTime>,
    /// 末帧在各跳的出口时刻，供同一消息的下一车续推。
    pub pipeline: Vec<SimTime>,
    /// 末帧到达加上路径固定延迟。
    pub delivered_at: SimTime,
    /// 首帧第一个 bit 的到达时刻（不含固定延迟）。
    pub first_bit_at: SimTime,
}

/// 一条路径的串行化点与固定延迟。
#[derive(Debug, Clone)]
pub struct PathProfile {
    pub class: HopClass,
    pub speeds_bps: Vec<f64>,
    pub fixed_delay_s: f64,
}

impl PathProfile {
    pub fn resolve(topo: &Topology, src: HostAddr, dst: HostAddr) -> SimResult<PathProfile> {
        let class = classify(src, dst)?;
        let nic = topo.nic_bps();
        let fab = topo.fabric_bps();
        let (speeds, num_switches, link_delays) = match class {
            HopClass::Loopback => {
                // 环回不经过任何链路，也不计固定延迟。
                return Ok(PathProfile {
                    class,
                    speeds_bps: Vec::new(),
                    fixed_delay_s: 0.0,
                });
            }
            HopClass::SameRack => (vec![nic, nic], 1, 2.0 * topo.edge_link_delay_s),
            HopClass::SamePod => (
                vec![nic, fab, fab, nic],
                3,
                2.0 * topo.edge_link_delay_s + 2.0 * topo.fabric_link_delay_s,
            ),
            HopClass::CrossPod => (
                vec![nic, fab, fab, fab, fab, nic],
                5,
                2.0 * topo.edge_link_delay_s + 4.0 * topo.fabric_link_delay_s,
            ),
        };

        // cut-through 下只剩发送 NIC（同机架）或发送 NIC + 第一段
        // fabric 链路这两个串行化点。
        let speeds_bps = if topo.cut_through {
            let keep = if class == HopClass::SameRack { 1 } else { 2 };
            speeds.into_iter().take(keep).collect()
        } else {
            speeds
        };

        let fixed_delay_s = link_delays
            + num_switches as f64 * topo.switch_fix_delay_s
            + 2.0 * topo.host_sw_turnaround_s
            + topo.host_nic_think_time_s;

        Ok(PathProfile {
            class,
            speeds_bps,
            fixed_delay_s,
        })
    }

    /// 从 `tx_start` 起发出一车帧（`wire_pkt_bytes` 为逐帧线上字节数），
    /// 返回整车的到达情况。`prior` 给出上一车的流水线行时继续填充。
    pub fn deliver(
        &self,
        tx_start: SimTime,
        wire_pkt_bytes: &[u64],
        prior: Option<&[SimTime]>,
    ) -> SimResult<Delivery> {
        let t0 = tx_start.0;
        if self.speeds_bps.is_empty() {
            // 环回：整车在发送开始的瞬间即视为到达。
            return Ok(Delivery {
                pkt_arrivals: vec![tx_start; wire_pkt_bytes.len()],
                pipeline: Vec::new(),
                delivered_at: tx_start,
                first_bit_at: tx_start,
            });
        }
        if wire_pkt_bytes.is_empty() {
            return Err(SimError::invariant("empty packet train delivered"));
        }

        let hops = self.speeds_bps.len();
        // row[k]：当前帧在第 k 跳的出口时刻；覆盖前的旧值即 A[n-1][k]。
        let mut row: Vec<f64> = match prior {
            Some(p) => {
                if p.len() != hops {
                    return Err(SimError::invariant(format!(
                        "pipeline row has {} hops, path has {hops}",
                        p.len()
                    )));
                }
                p.iter().map(|t| t.0).collect()
            }
            None => vec![t0; hops],
        };

        let last_hop = hops - 1;
        let mut pkt_arrivals = Vec::with_capacity(wire_pkt_bytes.len());
        let mut first_bit: Option<f64> = None;
        for &bytes in wire_pkt_bytes {
            let mut prev_hop = t0;
            for (k, speed) in self.speeds_bps.iter().enumerate() {
                let ser = bytes as f64 * 8.0 / speed;
                row[k] = ser + prev_hop.max(row[k]);
                prev_hop = row[k];
            }
            if first_bit.is_none() {
                first_bit = Some(row[last_hop] - bytes as f64 * 8.0 / self.speeds_bps[last_hop]);
            }
            pkt_arrivals.push(SimTime(row[last_hop]));
        }

        let first_bit = first_bit.unwrap_or(t0);
        // 加减同一串行化时长可能差出一两个 ulp，只拦真正的倒挂。
        let tol = t0.abs().max(1.0) * 1e-12;
        if first_bit + tol < t0 {
            return Err(SimError::invariant(format!(
                "first bit arrives at {first_bit} before tx start {t0}"
            )));
        }
        let first_bit_at = SimTime(first_bit.max(t0));

        let delivered_at = SimTime(row[last_hop] + self.fixed_delay_s);
        trace!(
            pkts = wire_pkt_bytes.len(),
            tx_start = t0,
            delivered = delivered_at.0,
            "列车送达"
        );

        Ok(Delivery {
            pkt_arrivals,
            pipeline: row.into_iter().map(SimTime).collect(),
            delivered_at,
            first_bit_at,
        })
    }
}
