use clap::Parser;
use srptsim_rs::error::SimError;
use srptsim_rs::sched::{CompletionRecord, OracleScheduler};
use srptsim_rs::trace::{TraceSpec, TrafficSource};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "oracle-sim",
    about = "Replay a message trace through the offline SRPT oracle"
)]
struct Args {
    /// Path to the trace JSON ({ "topology": {...}, "senders": [...] })
    #[arg(long)]
    trace: PathBuf,

    /// Write per-message completion records to this file
    #[arg(long)]
    records_out: Option<PathBuf>,

    /// Record format: jsonl or tsv
    #[arg(long, default_value = "jsonl")]
    format: String,

    /// Write per-receiver activity summaries (JSONL) to this file
    #[arg(long)]
    receivers_out: Option<PathBuf>,

    /// Print a one-line stretch percentile summary on stdout
    #[arg(long)]
    stretch_stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordFormat {
    Jsonl,
    Tsv,
}

fn parse_format(raw: &str) -> Option<RecordFormat> {
    match raw {
        "jsonl" => Some(RecordFormat::Jsonl),
        "tsv" => Some(RecordFormat::Tsv),
        _ => None,
    }
}

fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let p = if p <= 0.0 {
        0.0
    } else if p >= 1.0 {
        1.0
    } else {
        p
    };
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let idx = (p * sorted.len() as f64).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len().saturating_sub(1));
    sorted.get(idx).copied()
}

fn tsv_line(r: &CompletionRecord) -> String {
    format!(
        "{}\t{:.9}\t{:.9}\t{:.6}\t{}\t{}\t{}",
        r.size, r.creation_time.0, r.completion_time.0, r.stretch, r.id.0, r.sender, r.receiver
    )
}

fn render_records(records: &[CompletionRecord], format: RecordFormat) -> String {
    let mut out = String::new();
    match format {
        RecordFormat::Tsv => {
            out.push_str("size\tcreation_time\tcompletion_time\tstretch\tid\tsender\treceiver\n");
            for r in records {
                out.push_str(&tsv_line(r));
                out.push('\n');
            }
        }
        RecordFormat::Jsonl => {
            for r in records {
                out.push_str(&serde_json::to_string(r).expect("serialize completion record"));
                out.push('\n');
            }
        }
    }
    out
}

fn abort(err: SimError) -> ! {
    eprintln!("oracle-sim: {err}");
    std::process::exit(2);
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
    let format = parse_format(&args.format).unwrap_or_else(|| {
        eprintln!(
            "oracle-sim: unknown --format {:?} (expected jsonl or tsv)",
            args.format
        );
        std::process::exit(2);
    });

    let raw = fs::read_to_string(&args.trace).expect("read trace json");
    let spec: TraceSpec = serde_json::from_str(&raw).expect("parse trace json");

    let source = match TrafficSource::new(spec.senders) {
        Ok(source) => source,
        Err(err) => abort(err),
    };
    let sched = match OracleScheduler::new(spec.topology, source) {
        Ok(sched) => sched,
        Err(err) => abort(err),
    };
    let report = match sched.run() {
        Ok(report) => report,
        Err(err) => abort(err),
    };

    if args.stretch_stats {
        let stretches: Vec<f64> = report.records.iter().map(|r| r.stretch).collect();
        let mean = if stretches.is_empty() {
            0.0
        } else {
            stretches.iter().sum::<f64>() / stretches.len() as f64
        };
        println!(
            "stretch_stats msgs={} mean={:.6} p50={:.6} p90={:.6} p99={:.6} max={:.6}",
            stretches.len(),
            mean,
            percentile(&stretches, 0.50).unwrap_or(0.0),
            percentile(&stretches, 0.90).unwrap_or(0.0),
            percentile(&stretches, 0.99).unwrap_or(0.0),
            percentile(&stretches, 1.0).unwrap_or(0.0),
        );
    }

    if let Some(path) = &args.records_out {
        let body = render_records(&report.records, format);
        fs::write(path, body).expect("write records file");
        eprintln!(
            "wrote {} completion records to {}",
            report.records.len(),
            path.display()
        );
    }

    if let Some(path) = &args.receivers_out {
        let mut body = String::new();
        for summary in &report.receivers {
            body.push_str(&serde_json::to_string(summary).expect("serialize receiver summary"));
            body.push('\n');
        }
        fs::write(path, body).expect("write receivers file");
        eprintln!(
            "wrote {} receiver summaries to {}",
            report.receivers.len(),
            path.display()
        );
    }

    println!(
        "done @ {:.9}s, msgs={}, rounds={}",
        report.final_time.0,
        report.records.len(),
        report.rounds
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use srptsim_rs::fabric::HostAddr;
    use srptsim_rs::mesg::MsgId;
    use srptsim_rs::sim::SimTime;

    fn record(stretch: f64) -> CompletionRecord {
        CompletionRecord {
            size: 1000,
            creation_time: SimTime(1.0),
            completion_time: SimTime(1.5),
            stretch,
            id: MsgId(7),
            sender: HostAddr::new(0, 0, 1),
            receiver: HostAddr::new(0, 0, 2),
        }
    }

    #[test]
    fn percentile_handles_empty_and_bounds() {
        assert_eq!(percentile(&[], 0.5), None);
        let values = vec![3.0, 1.0, 2.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 0.5), Some(2.0));
        assert_eq!(percentile(&values, 1.0), Some(3.0));
        // Out-of-range p clamps instead of indexing out of bounds.
        assert_eq!(percentile(&values, 7.0), Some(3.0));
    }

    #[test]
    fn tsv_line_uses_dotted_addresses() {
        let line = tsv_line(&record(1.5));
        assert_eq!(line, "1000\t1.000000000\t1.500000000\t1.500000\t7\t10.0.0.1\t10.0.0.2");
    }

    #[test]
    fn render_tsv_starts_with_header() {
        let body = render_records(&[record(1.0)], RecordFormat::Tsv);
        let mut lines = body.lines();
        assert_eq!(
            lines.next(),
            Some("size\tcreation_time\tcompletion_time\tstretch\tid\tsender\treceiver")
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn render_jsonl_round_trips_through_serde() {
        let body = render_records(&[record(2.0)], RecordFormat::Jsonl);
        let parsed: CompletionRecord =
            serde_json::from_str(body.lines().next().expect("one line")).expect("parse record");
        assert_eq!(parsed.id, MsgId(7));
        assert_eq!(parsed.sender, HostAddr::new(0, 0, 1));
        assert!((parsed.stretch - 2.0).abs() < 1e-12);
    }

    #[test]
    fn parse_format_rejects_unknown_names() {
        assert_eq!(parse_format("jsonl"), Some(RecordFormat::Jsonl));
        assert_eq!(parse_format("tsv"), Some(RecordFormat::Tsv));
        assert_eq!(parse_format("csv"), None);
    }
}
