//! Step recorder.
//!
//! Every engine owns a [`StepRecorder`] for the duration of a call. Records are
//! append-only: each one gets the next sequential index and is never touched
//! again. Narration lines run alongside the snapshots and are not 1:1 with them.
use log::debug;
use nalgebra::DMatrix;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::numeric::matrix_as_fraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StepTag {
    Initial,
    Pivot,
    SwapRows,
    RowOp,
    Scale,
    Elimination,
    Upper,
    Rref,
    SarrusExtended,
    SarrusPos,
    SarrusNeg,
    #[strum(serialize = "minor_2x2")]
    #[serde(rename = "minor_2x2")]
    Minor2x2,
    CofactorMinor,
    CofactorValue,
    Result,
}

/// Typed numeric evidence attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepEvidence {
    Pivot {
        row: usize,
        col: usize,
        value: f64,
        value_pretty: String,
    },
    Swap {
        i: usize,
        j: usize,
    },
    RowOp {
        target: usize,
        source: usize,
        factor: f64,
    },
    Diagonal {
        label: String,
        terms: Vec<f64>,
        product: f64,
    },
    Minor {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        det: f64,
    },
    Cofactor {
        row: usize,
        col: usize,
        sign: i32,
        entry: f64,
        minor_det: f64,
        cofactor: f64,
    },
    Value {
        value: f64,
        pretty: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub tag: StepTag,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<StepEvidence>,
}

/// Finished log of one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepLog {
    /// Plain narration lines (elementwise ops, products, vector ops).
    Flat { lines: Vec<String> },
    /// Matrix snapshots plus narration (row reduction, determinants, inverse).
    Framed {
        states: Vec<StepRecord>,
        narration: Vec<String>,
    },
}

impl StepLog {
    pub fn flat(lines: Vec<String>) -> Self {
        StepLog::Flat { lines }
    }

    pub fn states(&self) -> &[StepRecord] {
        match self {
            StepLog::Flat { .. } => &[],
            StepLog::Framed { states, .. } => states,
        }
    }

    pub fn lines(&self) -> &[String] {
        match self {
            StepLog::Flat { lines } => lines,
            StepLog::Framed { narration, .. } => narration,
        }
    }

    pub fn count_tag(&self, tag: StepTag) -> usize {
        self.states().iter().filter(|r| r.tag == tag).count()
    }
}

#[derive(Debug, Default)]
pub struct StepRecorder {
    states: Vec<StepRecord>,
    narration: Vec<String>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its index.
    pub fn push(
        &mut self,
        tag: StepTag,
        operation: impl Into<String>,
        snapshot: Option<&DMatrix<f64>>,
        note: Option<String>,
        evidence: Option<StepEvidence>,
    ) -> usize {
        let index = self.states.len();
        let operation = operation.into();
        debug!("step {index} [{tag}] {operation}");
        self.states.push(StepRecord {
            index,
            tag,
            operation,
            matrix: snapshot.map(matrix_as_fraction),
            note,
            evidence,
        });
        index
    }

    /// Record with a snapshot and nothing else.
    pub fn snapshot(&mut self, tag: StepTag, operation: impl Into<String>, m: &DMatrix<f64>) -> usize {
        self.push(tag, operation, Some(m), None, None)
    }

    pub fn narrate(&mut self, line: impl Into<String>) {
        self.narration.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StepRecord] {
        &self.states
    }

    pub fn narration(&self) -> &[String] {
        &self.narration
    }

    pub fn finish(self) -> StepLog {
        StepLog::Framed {
            states: self.states,
            narration: self.narration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_sequential() {
        let mut rec = StepRecorder::new();
        let m = DMatrix::from_row_slice(1, 2, &[0.5, 2.0]);
        assert_eq!(rec.snapshot(StepTag::Initial, "Initial", &m), 0);
        assert_eq!(
            rec.push(
                StepTag::SwapRows,
                "R1 <-> R2",
                None,
                None,
                Some(StepEvidence::Swap { i: 0, j: 1 })
            ),
            1
        );
        rec.narrate("first");
        rec.narrate("second");
        let log = rec.finish();
        let states = log.states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].matrix.as_ref().unwrap()[0], vec!["1/2", "2"]);
        assert_eq!(log.lines(), &["first".to_string(), "second".to_string()]);
        assert_eq!(log.count_tag(StepTag::SwapRows), 1);
    }

    #[test]
    fn tags_use_snake_case_names() {
        assert_eq!(StepTag::SwapRows.to_string(), "swap_rows");
        assert_eq!(StepTag::Minor2x2.to_string(), "minor_2x2");
        assert_eq!("cofactor_value".parse::<StepTag>().unwrap(), StepTag::CofactorValue);
    }

    #[test]
    fn log_serializes_with_kind_tag() {
        let log = StepLog::flat(vec!["a".into()]);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["kind"], "flat");
        assert_eq!(json["lines"][0], "a");
        let mut rec = StepRecorder::new();
        rec.push(StepTag::Result, "det = 3", None, None, None);
        let json = serde_json::to_value(rec.finish()).unwrap();
        assert_eq!(json["kind"], "framed");
        assert_eq!(json["states"][0]["tag"], "result");
        assert!(json["states"][0].get("matrix").is_none());
    }
}
