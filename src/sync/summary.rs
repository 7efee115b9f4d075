// src/sync/summary.rs

//! Transfer statistics scraped from rsync's closing lines.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SENT_RECEIVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sent\s+([0-9,]+)\s+bytes\s+received\s+([0-9,]+)\s+bytes")
        .expect("constant regex pattern is valid")
});
static TOTAL_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"total size is\s+([0-9,]+)").expect("constant regex pattern is valid")
});
static SPEEDUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"speedup is\s+([0-9.]+)").expect("constant regex pattern is valid")
});

/// Fields absent from the text stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub sent_bytes: Option<u64>,
    pub received_bytes: Option<u64>,
    pub total_size_bytes: Option<u64>,
    pub speedup: Option<f64>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.sent_bytes.is_none()
            && self.received_bytes.is_none()
            && self.total_size_bytes.is_none()
            && self.speedup.is_none()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(n) = self.sent_bytes {
            parts.push(format!("sent={n}B"));
        }
        if let Some(n) = self.received_bytes {
            parts.push(format!("received={n}B"));
        }
        if let Some(n) = self.total_size_bytes {
            parts.push(format!("total={n}B"));
        }
        if let Some(x) = self.speedup {
            parts.push(format!("speedup={x:.2}"));
        }
        if parts.is_empty() {
            f.write_str("(no summary)")
        } else {
            f.write_str(&parts.join("  "))
        }
    }
}

/// Extract the summary from rsync output. Never fails; when a line appears
/// more than once the last occurrence wins.
pub fn parse_summary(text: &str) -> Summary {
    let (sent_bytes, received_bytes) = last_captures(&SENT_RECEIVED, text)
        .map(|caps| (to_int(caps.get(1)), to_int(caps.get(2))))
        .unwrap_or_default();

    Summary {
        sent_bytes,
        received_bytes,
        total_size_bytes: last_captures(&TOTAL_SIZE, text).and_then(|caps| to_int(caps.get(1))),
        speedup: last_captures(&SPEEDUP, text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok()),
    }
}

fn last_captures<'t>(re: &Regex, text: &'t str) -> Option<regex::Captures<'t>> {
    re.captures_iter(text).last()
}

fn to_int(m: Option<regex::Match<'_>>) -> Option<u64> {
    m?.as_str().replace(',', "").parse().ok()
}
