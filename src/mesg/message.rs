//! 消息状态机
//!
//! 一条消息创建时即持有全部线上帧；发送按调度窗口推进，每个突发记为
//! 一个帧列车（无缝衔接的突发并成一车）；发送侧排空后一次性沿路径
//! 模型结清所有列车的到达时刻。

use super::id::MsgId;
use super::train::PacketTrain;
use crate::error::{SimError, SimResult};
use crate::fabric::{HostAddr, PathProfile, Topology};
use crate::sim::SimTime;
use crate::wire::{Framing, WirePacket};
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MsgId,
    pub created_at: SimTime,
    pub src: HostAddr,
    pub dst: HostAddr,
    /// 逻辑消息字节数。
    pub size_bytes: u64,
    /// 帧化后的线上总字节数。
    pub wire_bytes_total: u64,
    /// 无竞争时整条消息的送达时刻，stretch 的分母。
    pub ideal_completion: SimTime,

    path: PathProfile,
    nic_bps: f64,
    tx_queue: VecDeque<WirePacket>,
    wire_bytes_left: u64,
    bytes_to_send: u64,
    bytes_to_recv: u64,
    inflight: Vec<PacketTrain>,
    received: Vec<PacketTrain>,
    /// 队首帧已有部分字节进入末尾列车。
    head_straddles: bool,
    recv_time: Option<SimTime>,
    reception_start: Option<SimTime>,
}

impl Message {
    pub fn new(
        id: MsgId,
        created_at: SimTime,
        src: HostAddr,
        dst: HostAddr,
        size_bytes: u64,
        topo: &Topology,
        framing: &Framing,
    ) -> SimResult<Message> {
        let framed = framing.frame(size_bytes);
        let path = PathProfile::resolve(topo, src, dst)?;

        // 无竞争下界：整条消息从创建时刻起一口气成车发出。
        let pkt_bytes: Vec<u64> = framed.pkts.iter().map(|p| p.wire_bytes()).collect();
        let ideal_completion = path
            .deliver(created_at, &pkt_bytes, None)
            .map_err(|e| e.for_mesg(id))?
            .delivered_at;

        Ok(Message {
            id,
            created_at,
            src,
            dst,
            size_bytes,
            wire_bytes_total: framed.wire_bytes_total,
            ideal_completion,
            path,
            nic_bps: topo.nic_bps(),
            tx_queue: framed.pkts.into(),
            wire_bytes_left: framed.wire_bytes_total,
            bytes_to_send: size_bytes,
            bytes_to_recv: size_bytes,
            inflight: Vec::new(),
            received: Vec::new(),
            head_straddles: false,
            recv_time: None,
            reception_start: None,
        })
    }

    pub fn bytes_to_send(&self) -> u64 {
        self.bytes_to_send
    }

    pub fn bytes_to_recv(&self) -> u64 {
        self.bytes_to_recv
    }

    pub fn recv_time(&self) -> Option<SimTime> {
        self.recv_time
    }

    /// 首个 bit 到达接收端的时刻，接收结清后可用。
    pub fn reception_start(&self) -> Option<SimTime> {
        self.reception_start
    }

    pub fn path(&self) -> &PathProfile {
        &self.path
    }

    /// 尚未结清的帧列车。
    pub fn inflight_trains(&self) -> &[PacketTrain] {
        &self.inflight
    }

    /// 已结清的帧列车。
    pub fn received_trains(&self) -> &[PacketTrain] {
        &self.received
    }

    /// 以 NIC 线速清空剩余线上字节所需的时长（秒）。
    pub fn tx_remaining_secs(&self) -> f64 {
        self.wire_bytes_left as f64 * 8.0 / self.nic_bps
    }

    /// 在 [tx_start, tx_stop) 内以 NIC 线速发送。帧内头字节先于数据
    /// 字节消耗，只有数据字节推进 `bytes_to_send`。返回剩余数据字节。
    pub fn transmit(&mut self, tx_start: SimTime, tx_stop: SimTime) -> SimResult<u64> {
        if tx_stop < tx_start {
            return Err(SimError::invariant(format!(
                "tx window runs backwards ({} -> {})",
                tx_start.0, tx_stop.0
            ))
            .for_mesg(self.id));
        }
        if self.bytes_to_send == 0 {
            return Err(SimError::invariant("transmit on a drained message").for_mesg(self.id));
        }

        let window = tx_stop.0 - tx_start.0;
        let mut allowed = (window * self.nic_bps / 8.0).round() as u64;
        if allowed == 0 {
            return Ok(self.bytes_to_send);
        }

        // 与上一突发无缝衔接时延续同一列车；跨突发的半个帧并回尾项。
        let contiguous = matches!(self.inflight.last(), Some(t) if t.tx_stop == tx_start);
        let mut merge_tail = contiguous && self.head_straddles;
        if !contiguous {
            self.inflight.push(PacketTrain::open(tx_start));
        }

        let mut wire_sent: u64 = 0;
        let mut data_sent: u64 = 0;
        while allowed > 0 {
            let Some(pkt) = self.tx_queue.front_mut() else {
                break;
            };
            let take = allowed.min(pkt.wire_bytes());
            let hdr_take = take.min(pkt.header_bytes);
            let data_take = take - hdr_take;
            pkt.header_bytes -= hdr_take;
            pkt.payload_bytes -= data_take;
            allowed -= take;
            wire_sent += take;
            data_sent += data_take;

            let train = self.inflight.last_mut().expect("train opened above");
            if merge_tail {
                train.grow_tail(take);
                merge_tail = false;
            } else {
                train.push_pkt(take);
            }

            if pkt.wire_bytes() == 0 {
                self.tx_queue.pop_front();
                self.head_straddles = false;
            } else {
                self.head_straddles = true;
            }
        }

        self.bytes_to_send = self
            .bytes_to_send
            .checked_sub(data_sent)
            .ok_or_else(|| SimError::invariant("bytes_to_send underflow").for_mesg(self.id))?;
        self.wire_bytes_left = self
            .wire_bytes_left
            .checked_sub(wire_sent)
            .ok_or_else(|| SimError::invariant("wire byte underflow").for_mesg(self.id))?;

        let train = self.inflight.last_mut().expect("train opened above");
        train.data_bytes += data_sent;
        // 帧队列清空时按实际串行化时长收口，否则整窗占满。
        train.tx_stop = if self.tx_queue.is_empty() {
            SimTime(tx_start.0 + wire_sent as f64 * 8.0 / self.nic_bps)
        } else {
            tx_stop
        };

        Ok(self.bytes_to_send)
    }

    /// 发送排空后结清接收：逐车经路径模型送达，车与车之间流水线不
    /// 清空。返回整条消息的送达时刻。
    #[tracing::instrument(skip(self), fields(mesg = self.id.0))]
    pub fn finalize_reception(&mut self) -> SimResult<SimTime> {
        if self.bytes_to_send != 0 {
            return Err(
                SimError::invariant("finalize before the send side drained").for_mesg(self.id)
            );
        }
        if self.recv_time.is_some() {
            return Err(SimError::invariant("reception finalized twice").for_mesg(self.id));
        }

        let trains = std::mem::take(&mut self.inflight);
        let mut pipeline: Option<Vec<SimTime>> = None;
        let mut recv_time = self.created_at;
        let mut first_bit: Option<SimTime> = None;
        for train in trains {
            let delivery = self
                .path
                .deliver(train.tx_start, &train.wire_pkts, pipeline.as_deref())
                .map_err(|e| e.for_mesg(self.id))?;
            self.bytes_to_recv = self
                .bytes_to_recv
                .checked_sub(train.data_bytes)
                .ok_or_else(|| SimError::invariant("bytes_to_recv underflow").for_mesg(self.id))?;
            recv_time = recv_time.max(delivery.delivered_at);
            first_bit = Some(match first_bit {
                Some(fb) => fb.min(delivery.first_bit_at),
                None => delivery.first_bit_at,
            });
            pipeline = Some(delivery.pipeline);
            self.received.push(train);
        }

        if self.bytes_to_recv != 0 {
            return Err(SimError::invariant(format!(
                "{} data bytes were never delivered",
                self.bytes_to_recv
            ))
            .for_mesg(self.id));
        }

        self.recv_time = Some(recv_time);
        self.reception_start = first_bit.or(Some(recv_time));
        debug!(
            recv_time = recv_time.0,
            first_bit = self.reception_start.map(|t| t.0),
            trains = self.received.len(),
            "消息接收结清"
        );
        Ok(recv_time)
    }
}

// SRPT 全序：剩余数据少者优先，其余字段只为确定性地打破并列。
impl Ord for Message {
    fn cmp(&self, other: &Self) -> Ordering {
        (
            self.bytes_to_send,
            self.size_bytes,
            self.created_at,
            self.src,
            self.dst,
            self.id,
        )
            .cmp(&(
                other.bytes_to_send,
                other.size_bytes,
                other.created_at,
                other.src,
                other.dst,
                other.id,
            ))
    }
}

impl PartialOrd for Message {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Message {}
