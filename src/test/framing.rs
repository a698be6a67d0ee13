use crate::wire::Framing;

#[test]
fn default_framing_derived_constants() {
    let f = Framing::default();
    assert_eq!(f.frame_overhead(), 38);
    assert_eq!(f.max_frame_bytes(), 1538);
    assert_eq!(f.min_frame_bytes(), 84);
    assert_eq!(f.max_data_per_pkt(), 1442);
    assert_eq!(f.full_pkt_header(), 96);
}

#[test]
fn zero_byte_message_still_occupies_one_frame() {
    let framed = Framing::default().frame(0);
    assert_eq!(framed.pkts.len(), 1);
    assert_eq!(framed.pkts[0].payload_bytes, 0);
    // Protocol headers alone exceed the Ethernet minimum, so no padding.
    assert_eq!(framed.pkts[0].header_bytes, 96);
    assert_eq!(framed.wire_bytes_total, 96);
}

#[test]
fn one_byte_message_rides_one_frame() {
    let framed = Framing::default().frame(1);
    assert_eq!(framed.pkts.len(), 1);
    assert_eq!(framed.pkts[0].payload_bytes, 1);
    assert_eq!(framed.pkts[0].header_bytes, 96);
    assert_eq!(framed.wire_bytes_total, 97);
}

#[test]
fn exact_multiple_of_the_data_capacity_has_no_tail_frame() {
    let f = Framing::default();
    let framed = f.frame(1442);
    assert_eq!(framed.pkts.len(), 1);
    assert_eq!(framed.pkts[0].payload_bytes, 1442);
    assert_eq!(framed.wire_bytes_total, 1538);

    let framed = f.frame(2 * 1442);
    assert_eq!(framed.pkts.len(), 2);
    assert_eq!(framed.wire_bytes_total, 2 * 1538);
}

#[test]
fn one_byte_past_the_capacity_adds_a_tail_frame() {
    let framed = Framing::default().frame(1443);
    assert_eq!(framed.pkts.len(), 2);
    assert_eq!(framed.pkts[0].payload_bytes, 1442);
    assert_eq!(framed.pkts[1].payload_bytes, 1);
    assert_eq!(framed.wire_bytes_total, 1538 + 97);
}

#[test]
fn padding_counts_as_header_bytes() {
    // Default protocol headers always clear the Ethernet minimum, so use a
    // thin header stack to reach the padded regime.
    let f = Framing {
        proto_hdr_bytes: 4,
        ..Framing::default()
    };
    let framed = f.frame(10);
    assert_eq!(framed.pkts.len(), 1);
    assert_eq!(framed.pkts[0].payload_bytes, 10);
    // 10 data + 4 proto = 14 on the medium, padded up to 46, plus 38 overhead.
    assert_eq!(framed.pkts[0].wire_bytes(), f.min_frame_bytes());
    assert_eq!(framed.pkts[0].header_bytes, 84 - 10);
    assert_eq!(framed.wire_bytes_total, 84);
}

#[test]
fn framing_conserves_data_and_wire_bytes() {
    let f = Framing::default();
    for size in [0u64, 1, 45, 46, 1441, 1442, 1443, 2884, 2885, 123_457] {
        let framed = f.frame(size);
        let data: u64 = framed.pkts.iter().map(|p| p.payload_bytes).sum();
        let wire: u64 = framed.pkts.iter().map(|p| p.wire_bytes()).sum();
        assert_eq!(data, size, "data bytes for size {size}");
        assert_eq!(wire, framed.wire_bytes_total, "wire bytes for size {size}");
        for p in &framed.pkts {
            assert!(p.wire_bytes() >= f.min_frame_bytes(), "runt frame for size {size}");
            assert!(p.wire_bytes() <= f.max_frame_bytes(), "oversize frame for size {size}");
        }
    }
}
