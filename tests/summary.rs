// tests/summary.rs

use syncroute::sync::{Summary, parse_summary};

const RSYNC_TAIL: &str = "\
sending incremental file list
data/a.txt
          1,024 100%    0.00kB/s    0:00:00 (xfr#1, to-chk=0/2)

sent 1,234 bytes  received 56 bytes  2,580.00 bytes/sec
total size is 9,999  speedup is 3.21
";

#[test]
fn parses_rsync_closing_lines() {
    let summary = parse_summary(RSYNC_TAIL);

    assert_eq!(summary.sent_bytes, Some(1234));
    assert_eq!(summary.received_bytes, Some(56));
    assert_eq!(summary.total_size_bytes, Some(9999));
    assert_eq!(summary.speedup, Some(3.21));
    assert!(!summary.is_empty());
}

#[test]
fn text_without_summary_yields_empty_fields() {
    let summary = parse_summary("nothing to see here\n");
    assert_eq!(summary, Summary::default());
    assert!(summary.is_empty());
    assert_eq!(summary.to_string(), "(no summary)");
}

#[test]
fn last_occurrence_wins() {
    let text = "sent 1 bytes received 2 bytes\nsent 3 bytes received 4 bytes\n";
    let summary = parse_summary(text);
    assert_eq!(summary.sent_bytes, Some(3));
    assert_eq!(summary.received_bytes, Some(4));
    assert_eq!(summary.total_size_bytes, None);
}

#[test]
fn display_lists_present_fields() {
    let summary = parse_summary("total size is 2,048  speedup is 1.50");
    assert_eq!(summary.to_string(), "total=2048B  speedup=1.50");
}
