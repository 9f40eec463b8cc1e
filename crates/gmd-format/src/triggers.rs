//! Sequence-trigger payloads embedded in level data.
//!
//! A sequence trigger is an object record containing the literal `1,3607,`.
//! Its payload is the last comma field of the record: a dot-separated list of
//! integers. Two readings of that list exist:
//!
//! - the `.gmd3` run-length form, consecutive `(loops, group, activation)`
//!   triples, expanded in place by [`decompress_sequence_triggers`];
//! - the plain form, consecutive `(group, activations)` pairs, read by
//!   [`parse_sequence_triggers`].
//!
//! Nothing in the data says which form a payload is in. Callers decide.
//!
//! # Example
//!
//! ```
//! use gmd_format::{decompress_sequence_triggers, parse_sequence_triggers};
//!
//! let mut data = "1,3607,2,3,51,3.5.10;".to_string();
//! decompress_sequence_triggers(&mut data);
//! assert_eq!(data, "1,3607,2,3,51,5.10.5.10.5.10;");
//!
//! let triggers = parse_sequence_triggers(&data);
//! assert_eq!(triggers.len(), 3);
//! ```

use std::ops::Range;

use tracing::{debug, warn};

/// Literal that marks a sequence-trigger record.
pub const SEQUENCE_TRIGGER_MARKER: &str = "1,3607,";

/// Upper bound on the repetitions a single triple may expand to (2^60).
pub const LOOP_CEILING: i64 = 1 << 60;

const RECORD_TERMINATOR: char = ';';

/// One `(group, activations)` entry of a sequence trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTrigger {
    pub group: i64,
    pub activations: i64,
}

/// A payload token that did not parse as an integer and was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedToken {
    /// Byte offset of the owning record's marker in the scanned text.
    pub record_offset: usize,
    pub token: String,
}

/// Summary of a [`decompress_sequence_triggers`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerExpansion {
    /// Records whose payload was rewritten.
    pub records: usize,
    pub rejected: Vec<RejectedToken>,
}

/// Result of a read-only [`scan_sequence_triggers`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerScan {
    /// Triggers in file order, duplicates included.
    pub triggers: Vec<SequenceTrigger>,
    pub rejected: Vec<RejectedToken>,
}

/// Integers parsed from a payload, plus the tokens that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadValues {
    pub values: Vec<i64>,
    pub rejected: Vec<String>,
}

/// Location of one trigger record inside the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TriggerRecord {
    marker: usize,
    payload: Range<usize>,
    terminator: usize,
}

/// Find the next trigger record at or after `from`.
///
/// Returns `None` when no marker remains, or when a marker has no `;` after
/// it; the unterminated tail is never processed.
fn locate_record(data: &str, from: usize) -> Option<TriggerRecord> {
    let marker = from + data.get(from..)?.find(SEQUENCE_TRIGGER_MARKER)?;
    let terminator = marker + data[marker..].find(RECORD_TERMINATOR)?;
    let body_start = marker + SEQUENCE_TRIGGER_MARKER.len();
    let payload_start = match data[body_start..terminator].rfind(',') {
        Some(comma) => body_start + comma + 1,
        None => body_start,
    };
    Some(TriggerRecord {
        marker,
        payload: payload_start..terminator,
        terminator,
    })
}

/// Split a payload on `.` and parse each token as an `i64`.
///
/// Tokens that fail to parse are dropped from `values`; non-empty ones are
/// listed in `rejected`.
#[must_use]
pub fn parse_payload(payload: &str) -> PayloadValues {
    let mut parsed = PayloadValues::default();
    for token in payload.split('.') {
        match token.parse::<i64>() {
            Ok(value) => parsed.values.push(value),
            Err(_) if token.is_empty() => {}
            Err(_) => parsed.rejected.push(token.to_string()),
        }
    }
    parsed
}

/// Clamp a loop count to `ceiling`.
#[must_use]
pub fn effective_loops(loops: i64, ceiling: i64) -> i64 {
    loops.min(ceiling)
}

/// Expand `(loops, group, activation)` triples into dot-joined pairs.
///
/// A trailing partial triple is ignored. Non-positive loop counts emit
/// nothing. Pairs are separated by a single `.`; the output never starts
/// with one.
#[must_use]
pub fn expand_triples(values: &[i64], ceiling: i64) -> String {
    let mut out = String::new();
    for triple in values.chunks_exact(3) {
        let loops = effective_loops(triple[0], ceiling);
        let pair = format!("{}.{}", triple[1], triple[2]);
        for _ in 0..loops {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&pair);
        }
    }
    out
}

/// Expand every run-length encoded trigger payload in place.
///
/// Only the payload span of each record is replaced. Scanning resumes after
/// the rewritten record's terminator, so expanded output is never revisited
/// within a pass.
pub fn decompress_sequence_triggers(data: &mut String) -> TriggerExpansion {
    let mut report = TriggerExpansion::default();
    let mut pos = 0;
    while let Some(record) = locate_record(data, pos) {
        let parsed = parse_payload(&data[record.payload.clone()]);
        for token in parsed.rejected {
            warn!(offset = record.marker, token = %token, "dropping non-integer trigger token");
            report.rejected.push(RejectedToken {
                record_offset: record.marker,
                token,
            });
        }

        let expanded = expand_triples(&parsed.values, LOOP_CEILING);
        data.replace_range(record.payload.clone(), &expanded);
        report.records += 1;

        // The record changed length; find its terminator again.
        let Some(terminator) = data[record.marker..].find(RECORD_TERMINATOR) else {
            break;
        };
        pos = record.marker + terminator + 1;
    }
    debug!(
        records = report.records,
        rejected = report.rejected.len(),
        "expanded sequence triggers"
    );
    report
}

/// Enumerate triggers as `(group, activations)` pairs without mutating.
#[must_use]
pub fn scan_sequence_triggers(data: &str) -> TriggerScan {
    let mut scan = TriggerScan::default();
    let mut pos = 0;
    while let Some(record) = locate_record(data, pos) {
        let parsed = parse_payload(&data[record.payload.clone()]);
        scan.triggers.extend(parsed.values.chunks_exact(2).map(|pair| SequenceTrigger {
            group: pair[0],
            activations: pair[1],
        }));
        scan.rejected
            .extend(parsed.rejected.into_iter().map(|token| RejectedToken {
                record_offset: record.marker,
                token,
            }));
        pos = record.terminator + 1;
    }
    scan
}

/// Enumerate triggers as `(group, activations)` pairs, in file order.
#[must_use]
pub fn parse_sequence_triggers(data: &str) -> Vec<SequenceTrigger> {
    scan_sequence_triggers(data).triggers
}
