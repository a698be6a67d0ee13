use crate::error::SimError;
use crate::fabric::HostAddr;
use crate::sim::SimTime;
use crate::trace::{SenderTrace, TraceMesg, TrafficSource};

fn tm(at: f64, size_bytes: u64, receiver: HostAddr) -> TraceMesg {
    TraceMesg {
        arrival_time: SimTime(at),
        size_bytes,
        receiver,
    }
}

fn block(sender: HostAddr, messages: Vec<TraceMesg>) -> SenderTrace {
    SenderTrace { sender, messages }
}

fn h(server: u8) -> HostAddr {
    HostAddr::new(0, 0, server)
}

#[test]
fn merges_senders_into_one_time_ordered_stream() {
    let mut source = TrafficSource::new(vec![
        block(h(1), vec![tm(2.0, 100, h(9))]),
        block(h(2), vec![tm(1.0, 100, h(9)), tm(3.0, 100, h(9))]),
    ])
    .expect("valid trace");

    assert_eq!(source.remaining(), 3);
    assert_eq!(source.peek_due_time(), SimTime(1.0));

    let first = source.pop_due().expect("first");
    assert_eq!(first.at, SimTime(1.0));
    assert_eq!(first.src, h(2));

    let second = source.pop_due().expect("second");
    assert_eq!(second.at, SimTime(2.0));
    assert_eq!(second.src, h(1));

    let third = source.pop_due().expect("third");
    assert_eq!(third.at, SimTime(3.0));
    assert_eq!(source.remaining(), 0);
    assert!(source.is_empty());
}

#[test]
fn holds_one_pending_arrival_per_sender() {
    let mut source = TrafficSource::new(vec![block(
        h(1),
        vec![tm(0.0, 10, h(9)), tm(0.0, 20, h(9)), tm(5.0, 30, h(9))],
    )])
    .expect("valid trace");

    // The second same-timestamp message only surfaces after the first pops.
    assert_eq!(source.pop_due().expect("pop").size_bytes, 10);
    assert_eq!(source.peek_due_time(), SimTime(0.0));
    assert_eq!(source.pop_due().expect("pop").size_bytes, 20);
    assert_eq!(source.peek_due_time(), SimTime(5.0));
    assert_eq!(source.pop_due().expect("pop").size_bytes, 30);
    assert!(source.pop_due().is_none());
}

#[test]
fn peek_does_not_consume() {
    let source = TrafficSource::new(vec![block(h(1), vec![tm(1.5, 100, h(9))])])
        .expect("valid trace");
    assert_eq!(source.peek_due_time(), SimTime(1.5));
    assert_eq!(source.peek_due_time(), SimTime(1.5));
    assert_eq!(source.remaining(), 1);
}

#[test]
fn a_drained_source_reports_an_infinite_due_time() {
    let mut source = TrafficSource::new(Vec::new()).expect("empty trace");
    assert!(source.is_empty());
    assert_eq!(source.remaining(), 0);
    assert_eq!(source.peek_due_time(), SimTime::INFINITY);
    assert!(source.pop_due().is_none());
}

#[test]
fn an_empty_sender_block_is_allowed() {
    let source = TrafficSource::new(vec![
        block(h(1), Vec::new()),
        block(h(2), vec![tm(0.0, 100, h(9))]),
    ])
    .expect("valid trace");
    assert_eq!(source.remaining(), 1);
}

#[test]
fn simultaneous_arrivals_order_by_size_then_receiver_then_sender() {
    let mut source = TrafficSource::new(vec![
        block(h(1), vec![tm(0.0, 200, h(9))]),
        block(h(2), vec![tm(0.0, 100, h(9))]),
    ])
    .expect("valid trace");
    assert_eq!(source.pop_due().expect("pop").size_bytes, 100);

    let mut source = TrafficSource::new(vec![
        block(h(1), vec![tm(0.0, 100, h(8))]),
        block(h(2), vec![tm(0.0, 100, h(7))]),
    ])
    .expect("valid trace");
    assert_eq!(source.pop_due().expect("pop").dst, h(7));

    let mut source = TrafficSource::new(vec![
        block(h(2), vec![tm(0.0, 100, h(9))]),
        block(h(1), vec![tm(0.0, 100, h(9))]),
    ])
    .expect("valid trace");
    assert_eq!(source.pop_due().expect("pop").src, h(1));
}

#[test]
fn rejects_out_of_order_arrival_times() {
    let err = TrafficSource::new(vec![block(
        h(1),
        vec![tm(2.0, 100, h(9)), tm(1.0, 100, h(9))],
    )])
    .expect_err("should reject");
    assert!(matches!(err, SimError::InvalidTrace(_)));
}

#[test]
fn rejects_zero_byte_messages() {
    let err = TrafficSource::new(vec![block(h(1), vec![tm(0.0, 0, h(9))])])
        .expect_err("should reject");
    assert!(matches!(err, SimError::InvalidTrace(_)));
}

#[test]
fn rejects_duplicate_sender_blocks() {
    let err = TrafficSource::new(vec![
        block(h(1), vec![tm(0.0, 100, h(9))]),
        block(h(1), vec![tm(1.0, 100, h(9))]),
    ])
    .expect_err("should reject");
    assert!(matches!(err, SimError::InvalidTrace(_)));
}

#[test]
fn rejects_negative_or_non_finite_arrival_times() {
    assert!(TrafficSource::new(vec![block(h(1), vec![tm(-1.0, 100, h(9))])]).is_err());
    assert!(TrafficSource::new(vec![block(h(1), vec![tm(f64::NAN, 100, h(9))])]).is_err());
    assert!(
        TrafficSource::new(vec![block(h(1), vec![tm(f64::INFINITY, 100, h(9))])]).is_err()
    );
}
