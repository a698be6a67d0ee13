//! 贪心 SRPT oracle 调度器
//!
//! 离线回放主循环。每一轮在“下一条到达的应到时刻”与“已排程消息中最早
//! 的发送完成时刻”之间取较早者作为本轮终点：窗口内所有已排程消息满速
//! 发送，随后接纳恰好到期的新消息，再按 SRPT 顺序重新做一次贪心匹配
//! （每个发送端、每个接收端一轮至多承载一条消息）。发送排空的消息当轮
//! 结清接收并产出完成记录。

use super::ledger::ReceiverLedger;
use super::record::{CompletionRecord, SimReport};
use crate::error::{SimError, SimResult};
use crate::fabric::{HostAddr, Topology};
use crate::mesg::{Message, MsgId};
use crate::sim::SimTime;
use crate::trace::TrafficSource;
use crate::wire::Framing;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use tracing::{debug, info, trace};

#[derive(Debug)]
pub struct OracleScheduler {
    topo: Topology,
    framing: Framing,
    source: TrafficSource,
    now: SimTime,
    next_id: u64,
    // BinaryHeap 是 max-heap；SRPT 要最小键优先，因此装 Reverse。
    pending: BinaryHeap<Reverse<Message>>,
    scheduled: Vec<Message>,
    ledger: ReceiverLedger,
    records: Vec<CompletionRecord>,
    num_hosts: usize,
    rounds: u64,
}

impl OracleScheduler {
    pub fn new(topo: Topology, source: TrafficSource) -> SimResult<OracleScheduler> {
        topo.validate()?;
        let num_hosts = topo.num_hosts();
        Ok(OracleScheduler {
            topo,
            framing: Framing::default(),
            source,
            now: SimTime::ZERO,
            next_id: 0,
            pending: BinaryHeap::new(),
            scheduled: Vec::new(),
            ledger: ReceiverLedger::default(),
            records: Vec::new(),
            num_hosts,
            rounds: 0,
        })
    }

    /// 替换默认帧参数。
    pub fn with_framing(mut self, framing: Framing) -> OracleScheduler {
        self.framing = framing;
        self
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 跑完整个 trace，返回全部完成记录与接收端汇总。
    #[tracing::instrument(skip(self))]
    pub fn run(mut self) -> SimResult<SimReport> {
        info!(
            messages = self.source.remaining(),
            hosts = self.num_hosts,
            "▶️  开始离线回放"
        );

        while !(self.source.is_empty() && self.pending.is_empty() && self.scheduled.is_empty()) {
            self.step()?;
        }

        self.ledger.finish();
        info!(
            rounds = self.rounds,
            records = self.records.len(),
            final_time = self.now.0,
            "✅ 回放完成"
        );
        Ok(SimReport {
            records: self.records,
            receivers: self.ledger.summaries(self.topo.nic_bps()),
            rounds: self.rounds,
            final_time: self.now,
        })
    }

    /// 执行一轮：跳到下一事件时刻，推进发送、接纳到达、重新匹配、
    /// 结清本轮发完的消息。
    fn step(&mut self) -> SimResult<()> {
        self.rounds += 1;
        let due = self.source.peek_due_time();
        let next = due.min(self.earliest_tx_completion());
        if !next.is_finite() {
            return Err(SimError::invariant(
                "no next event: source drained with nothing scheduled",
            ));
        }
        if next < self.now {
            return Err(SimError::invariant(format!(
                "event time went backwards ({} -> {})",
                self.now.0, next.0
            )));
        }
        let admit = due == next;
        trace!(round = self.rounds, now = self.now.0, next = next.0, "轮开始");

        // 窗口内所有已排程消息满速发送；发完的进完成列表（保持 SRPT
        // 顺序），其余退回待调度堆。
        let mut completed: Vec<Message> = Vec::new();
        for mut mesg in self.scheduled.drain(..) {
            let left = mesg.transmit(self.now, next)?;
            if left == 0 {
                completed.push(mesg);
            } else {
                self.pending.push(Reverse(mesg));
            }
        }

        // 零长度轮只在接纳同时刻到达时合法，否则就是停摆。
        if next == self.now && !admit && completed.is_empty() {
            return Err(SimError::invariant(
                "scheduler made no progress in a zero-length round",
            ));
        }
        self.now = next;

        if admit {
            let arrival = self
                .source
                .pop_due()
                .ok_or_else(|| SimError::invariant("due arrival vanished"))?;
            if arrival.at != self.now {
                return Err(SimError::invariant(format!(
                    "arrival due at {} admitted at {}",
                    arrival.at.0, self.now.0
                )));
            }
            let id = MsgId(self.next_id);
            self.next_id += 1;
            let mesg = Message::new(
                id,
                self.now,
                arrival.src,
                arrival.dst,
                arrival.size_bytes,
                &self.topo,
                &self.framing,
            )?;
            debug!(
                mesg = id.0,
                src = %arrival.src,
                dst = %arrival.dst,
                size = arrival.size_bytes,
                "📨 新消息入场"
            );
            self.ledger.on_mesg_created(arrival.dst, self.now);
            self.pending.push(Reverse(mesg));
        }

        self.rematch();

        for mut mesg in completed {
            let recv_time = mesg.finalize_reception()?;
            self.ledger
                .on_mesg_completed(mesg.dst, recv_time, mesg.size_bytes)?;
            self.records.push(Self::record_for(&mesg, recv_time));
        }
        Ok(())
    }

    /// 已排程消息里最早发完剩余线上字节的时刻；无排程时为无穷。
    fn earliest_tx_completion(&self) -> SimTime {
        self.scheduled
            .iter()
            .map(|m| SimTime(self.now.0 + m.tx_remaining_secs()))
            .min()
            .unwrap_or(SimTime::INFINITY)
    }

    /// 贪心匹配：按 SRPT 顺序出堆，发送端与接收端都空闲才排程；任一侧
    /// 占满即提前停止，落选者全部放回堆中。
    fn rematch(&mut self) {
        debug_assert!(self.scheduled.is_empty(), "rematch with stale schedule");
        let mut used_src: HashSet<HostAddr> = HashSet::new();
        let mut used_dst: HashSet<HostAddr> = HashSet::new();
        let mut passed_over: Vec<Message> = Vec::new();

        while used_src.len() < self.num_hosts && used_dst.len() < self.num_hosts {
            let Some(Reverse(mesg)) = self.pending.pop() else {
                break;
            };
            if used_src.contains(&mesg.src) || used_dst.contains(&mesg.dst) {
                passed_over.push(mesg);
            } else {
                used_src.insert(mesg.src);
                used_dst.insert(mesg.dst);
                self.scheduled.push(mesg);
            }
        }

        for mesg in passed_over {
            self.pending.push(Reverse(mesg));
        }
        trace!(
            scheduled = self.scheduled.len(),
            pending = self.pending.len(),
            "匹配完成"
        );
    }

    fn record_for(mesg: &Message, recv_time: SimTime) -> CompletionRecord {
        let denom = mesg.ideal_completion.0 - mesg.created_at.0;
        let stretch = if denom > 0.0 {
            (recv_time.0 - mesg.created_at.0) / denom
        } else {
            // 环回消息的理想完成时刻等于创建时刻。
            1.0
        };
        CompletionRecord {
            size: mesg.size_bytes,
            creation_time: mesg.created_at,
            completion_time: recv_time,
            stretch,
            id: mesg.id,
            sender: mesg.src,
            receiver: mesg.dst,
        }
    }
}
