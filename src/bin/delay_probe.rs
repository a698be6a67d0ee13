//! 单消息延迟探针
//!
//! 对一对地址和一个消息大小，打印帧化结果与空载路径上的逐帧到达
//! 时刻，用于核对延迟模型的每一项参数。

use clap::Parser;
use srptsim_rs::fabric::{HostAddr, PathProfile, Topology};
use srptsim_rs::sim::SimTime;
use srptsim_rs::wire::Framing;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "delay-probe",
    about = "单消息延迟探针：打印一条消息在空载路径上的逐帧到达时刻"
)]
struct Args {
    /// 消息大小（字节）
    #[arg(long, default_value_t = 3000)]
    size_bytes: u64,
    #[arg(long, default_value = "10.0.0.1")]
    src: HostAddr,
    #[arg(long, default_value = "10.1.0.1")]
    dst: HostAddr,
    /// 启用 cut-through 转发
    #[arg(long)]
    cut_through: bool,
    #[arg(long, default_value_t = 10.0)]
    nic_gbps: f64,
    #[arg(long, default_value_t = 40.0)]
    fabric_gbps: f64,
    /// 边缘链路传播时延（微秒）
    #[arg(long, default_value_t = 0.3)]
    edge_delay_us: f64,
    /// fabric 链路传播时延（微秒）
    #[arg(long, default_value_t = 0.3)]
    fabric_delay_us: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let topo = Topology {
        nic_link_speed_gbps: args.nic_gbps,
        fabric_link_speed_gbps: args.fabric_gbps,
        edge_link_delay_s: args.edge_delay_us * 1e-6,
        fabric_link_delay_s: args.fabric_delay_us * 1e-6,
        cut_through: args.cut_through,
        ..Topology::default()
    };
    if let Err(err) = topo.validate() {
        eprintln!("delay-probe: {err}");
        std::process::exit(2);
    }

    info!(src = %args.src, dst = %args.dst, size = args.size_bytes, "▶️  解析路径");

    let path = match PathProfile::resolve(&topo, args.src, args.dst) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("delay-probe: {err}");
            std::process::exit(2);
        }
    };
    debug!(speeds_bps = ?path.speeds_bps, "串行化速率");

    let framing = Framing::default();
    let framed = framing.frame(args.size_bytes);
    let wire_pkt_bytes: Vec<u64> = framed.pkts.iter().map(|p| p.wire_bytes()).collect();

    let delivery = match path.deliver(SimTime::ZERO, &wire_pkt_bytes, None) {
        Ok(delivery) => delivery,
        Err(err) => {
            eprintln!("delay-probe: {err}");
            std::process::exit(2);
        }
    };

    println!(
        "class={:?} serialization_points={} fixed_delay_us={:.3}",
        path.class,
        path.speeds_bps.len(),
        path.fixed_delay_s * 1e6
    );
    println!(
        "pkts={} wire_bytes_total={} (data {} + overhead {})",
        framed.pkts.len(),
        framed.wire_bytes_total,
        args.size_bytes,
        framed.wire_bytes_total - args.size_bytes
    );
    for (i, (pkt, at)) in framed.pkts.iter().zip(&delivery.pkt_arrivals).enumerate() {
        println!(
            "pkt[{i}] hdr={} data={} wire={} arrive_us={:.3}",
            pkt.header_bytes,
            pkt.payload_bytes,
            pkt.wire_bytes(),
            at.0 * 1e6
        );
    }
    println!(
        "first_bit_us={:.3} delivered_us={:.3}",
        delivery.first_bit_at.0 * 1e6,
        delivery.delivered_at.0 * 1e6
    );
}
