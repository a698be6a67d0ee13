//! Ethernet 帧开销模型
//!
//! 每个满载帧携带 `max_payload - proto_hdr` 字节消息数据；尾帧携带剩余
//! 数据，若载荷（数据 + 协议头）不足以太网最小载荷则补填充，填充一律
//! 计入头部字节，载荷字节只数消息数据。

/// 一个线上帧。`header_bytes` 含全部帧开销、协议头与填充，
/// `payload_bytes` 只含消息数据。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WirePacket {
    pub header_bytes: u64,
    pub payload_bytes: u64,
}

impl WirePacket {
    pub fn wire_bytes(&self) -> u64 {
        self.header_bytes + self.payload_bytes
    }
}

/// 帧化结果：总线上字节数与帧序列。
#[derive(Debug, Clone)]
pub struct FramedMessage {
    pub wire_bytes_total: u64,
    pub pkts: Vec<WirePacket>,
}

/// 帧参数（字节）。默认值：Ethernet + IPv4 + UDP + 传输层未调度头。
#[derive(Debug, Clone)]
pub struct Framing {
    /// 前导码
    pub preamble_bytes: u64,
    /// MAC 头
    pub ether_hdr_bytes: u64,
    /// 帧校验
    pub crc_bytes: u64,
    /// 帧间隙
    pub inter_pkt_gap_bytes: u64,
    /// 以太网最小载荷
    pub min_payload_bytes: u64,
    /// 以太网最大载荷（MTU）
    pub max_payload_bytes: u64,
    /// 每帧协议头合计（IPv4 20 + UDP 8 + 传输层 30）
    pub proto_hdr_bytes: u64,
}

impl Default for Framing {
    fn default() -> Self {
        Framing {
            preamble_bytes: 8,
            ether_hdr_bytes: 14,
            crc_bytes: 4,
            inter_pkt_gap_bytes: 12,
            min_payload_bytes: 46,
            max_payload_bytes: 1500,
            proto_hdr_bytes: 20 + 8 + 30,
        }
    }
}

impl Framing {
    /// 每帧链路层固定开销（前导码 + MAC 头 + CRC + 帧间隙）。
    pub fn frame_overhead(&self) -> u64 {
        self.preamble_bytes + self.ether_hdr_bytes + self.crc_bytes + self.inter_pkt_gap_bytes
    }

    pub fn max_frame_bytes(&self) -> u64 {
        self.max_payload_bytes + self.frame_overhead()
    }

    pub fn min_frame_bytes(&self) -> u64 {
        self.min_payload_bytes + self.frame_overhead()
    }

    /// 单帧可携带的消息数据上限。
    pub fn max_data_per_pkt(&self) -> u64 {
        self.max_payload_bytes - self.proto_hdr_bytes
    }

    /// 满载帧的非数据字节合计。
    pub fn full_pkt_header(&self) -> u64 {
        self.max_frame_bytes() - self.max_data_per_pkt()
    }

    /// 把 `logical_bytes` 映射为线上帧序列。纯函数，对任意字节数有定义。
    pub fn frame(&self, logical_bytes: u64) -> FramedMessage {
        assert!(
            self.max_payload_bytes > self.proto_hdr_bytes,
            "framing: protocol headers must fit in the payload"
        );
        let max_data = self.max_data_per_pkt();
        let full_pkts = logical_bytes / max_data;
        let rem = logical_bytes % max_data;

        let mut pkts = Vec::with_capacity(full_pkts as usize + 1);
        for _ in 0..full_pkts {
            pkts.push(WirePacket {
                header_bytes: self.full_pkt_header(),
                payload_bytes: max_data,
            });
        }
        let mut total = full_pkts * self.max_frame_bytes();

        // 恰好整除时没有尾帧；0 字节消息也会占一个纯头帧。
        if full_pkts == 0 || rem > 0 {
            let mut on_medium = rem + self.proto_hdr_bytes;
            if on_medium < self.min_payload_bytes {
                on_medium = self.min_payload_bytes;
            }
            let wire = on_medium + self.frame_overhead();
            pkts.push(WirePacket {
                header_bytes: wire - rem,
                payload_bytes: rem,
            });
            total += wire;
        }

        FramedMessage {
            wire_bytes_total: total,
            pkts,
        }
    }
}
