//! # Vector engine
//!
//! Elementary operations on coordinate vectors with one narration line per
//! stage and a diagram block of labelled arrows, plus the linear-combination
//! question answered by Gauss-Jordan.
//!
//! Operands are named like the textbook: `u`, `v`, `w` for vectors and `c`,
//! `d` for scalars.
pub mod combination;
pub mod operations;

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{format_number, vec_pretty};
use crate::steps::StepLog;

pub use combination::{LinearCombinationRequest, LinearCombinationResult, linear_combination, linear_combination_api};
pub use operations::{Arrow, Diagram, DiagramParts, add, diagram_for, dot, same_dim, scale, sub};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VectorOperation {
    /// u + v
    Add,
    /// u - v
    Sub,
    /// c·u
    Escalar,
    /// c·u + d·v
    Comb2,
    /// u + c·v + d·w
    Comb3,
    /// v · w
    Dot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorOpRequest {
    pub operation: VectorOperation,
    pub vectors: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub scalars: BTreeMap<String, f64>,
}

impl VectorOpRequest {
    pub fn new(operation: VectorOperation) -> Self {
        Self {
            operation,
            vectors: BTreeMap::new(),
            scalars: BTreeMap::new(),
        }
    }

    pub fn with_vector(mut self, name: &str, v: Vec<f64>) -> Self {
        self.vectors.insert(name.to_string(), v);
        self
    }

    pub fn with_scalar(mut self, name: &str, c: f64) -> Self {
        self.scalars.insert(name.to_string(), c);
        self
    }

    fn vector(&self, name: &str) -> EngineResult<&[f64]> {
        self.vectors
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                EngineError::validation(format!("{} requires vector {name}", self.operation))
            })
    }

    fn scalar(&self, name: &str) -> EngineResult<f64> {
        let c = *self.scalars.get(name).ok_or_else(|| {
            EngineError::validation(format!("{} requires scalar {name}", self.operation))
        })?;
        if !c.is_finite() {
            return Err(EngineError::validation(format!("scalar {name} must be finite")));
        }
        Ok(c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrettyVector {
    pub raw: Vec<f64>,
    pub pretty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrettyScalar {
    pub raw: f64,
    pub pretty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorOpInput {
    pub operation: VectorOperation,
    pub vectors: BTreeMap<String, PrettyVector>,
    pub scalars: BTreeMap<String, PrettyScalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VectorValue {
    Vector { vector: Vec<f64>, vector_pretty: String },
    Scalar { scalar: f64, scalar_pretty: String },
}

impl VectorValue {
    fn vector(v: Vec<f64>) -> Self {
        VectorValue::Vector {
            vector_pretty: vec_pretty(&v),
            vector: v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorOpResult {
    pub input: VectorOpInput,
    pub steps: StepLog,
    pub result: VectorValue,
    /// absent for the dot product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
}

fn echo(request: &VectorOpRequest) -> VectorOpInput {
    VectorOpInput {
        operation: request.operation,
        vectors: request
            .vectors
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    PrettyVector {
                        raw: v.clone(),
                        pretty: vec_pretty(v),
                    },
                )
            })
            .collect(),
        scalars: request
            .scalars
            .iter()
            .map(|(k, &c)| {
                (
                    k.clone(),
                    PrettyScalar {
                        raw: c,
                        pretty: format_number(c),
                    },
                )
            })
            .collect(),
    }
}

fn check_finite(request: &VectorOpRequest) -> EngineResult<()> {
    for (name, v) in &request.vectors {
        if v.iter().any(|x| !x.is_finite()) {
            return Err(EngineError::validation(format!(
                "vector {name} has non-finite components"
            )));
        }
    }
    Ok(())
}

pub fn vector_ops_api(request: &VectorOpRequest) -> EngineResult<VectorOpResult> {
    check_finite(request)?;
    let op = request.operation;
    let op_name = op.to_string();
    let mut lines = Vec::new();
    let (result, diagram) = match op {
        VectorOperation::Add | VectorOperation::Sub => {
            let (u, v) = (request.vector("u")?, request.vector("v")?);
            same_dim(&op_name, &[("u", u), ("v", v)])?;
            let (r, sign) = if op == VectorOperation::Add {
                (add(u, v), "+")
            } else {
                (sub(u, v), "-")
            };
            lines.push(format!(
                "u {sign} v = {} {sign} {} = {}",
                vec_pretty(u),
                vec_pretty(v),
                vec_pretty(&r)
            ));
            let parts = DiagramParts {
                u: Some(u),
                v: Some(v),
                ..Default::default()
            };
            let diagram = diagram_for(parts, &r);
            (VectorValue::vector(r), Some(diagram))
        }
        VectorOperation::Escalar => {
            let u = request.vector("u")?;
            same_dim(&op_name, &[("u", u)])?;
            let c = request.scalar("c")?;
            let r = scale(c, u);
            lines.push(operations::scaled_line("u", "c", c, u, &r));
            let parts = DiagramParts {
                u: Some(u),
                c: Some(c),
                ..Default::default()
            };
            let diagram = diagram_for(parts, &r);
            (VectorValue::vector(r), Some(diagram))
        }
        VectorOperation::Comb2 => {
            let (u, v) = (request.vector("u")?, request.vector("v")?);
            let (c, d) = (request.scalar("c")?, request.scalar("d")?);
            same_dim(&op_name, &[("u", u), ("v", v)])?;
            let (cu, dv) = (scale(c, u), scale(d, v));
            let r = add(&cu, &dv);
            lines.push(operations::scaled_line("u", "c", c, u, &cu));
            lines.push(operations::scaled_line("v", "d", d, v, &dv));
            lines.push(format!(
                "c·u + d·v = {} + {} = {}",
                vec_pretty(&cu),
                vec_pretty(&dv),
                vec_pretty(&r)
            ));
            let parts = DiagramParts {
                u: Some(u),
                v: Some(v),
                c: Some(c),
                d: Some(d),
                ..Default::default()
            };
            let diagram = diagram_for(parts, &r);
            (VectorValue::vector(r), Some(diagram))
        }
        VectorOperation::Comb3 => {
            let (u, v, w) = (
                request.vector("u")?,
                request.vector("v")?,
                request.vector("w")?,
            );
            let (c, d) = (request.scalar("c")?, request.scalar("d")?);
            same_dim(&op_name, &[("u", u), ("v", v), ("w", w)])?;
            let (cv, dw) = (scale(c, v), scale(d, w));
            let r = add(&add(u, &cv), &dw);
            lines.push(operations::scaled_line("v", "c", c, v, &cv));
            lines.push(operations::scaled_line("w", "d", d, w, &dw));
            lines.push(format!(
                "u + c·v + d·w = {} + {} + {} = {}",
                vec_pretty(u),
                vec_pretty(&cv),
                vec_pretty(&dw),
                vec_pretty(&r)
            ));
            let parts = DiagramParts {
                u: Some(u),
                v: Some(v),
                w: Some(w),
                c: Some(c),
                d: Some(d),
            };
            let diagram = diagram_for(parts, &r);
            (VectorValue::vector(r), Some(diagram))
        }
        VectorOperation::Dot => {
            let (v, w) = (request.vector("v")?, request.vector("w")?);
            same_dim(&op_name, &[("v", v), ("w", w)])?;
            let s = dot(v, w);
            lines.push(operations::dot_line(v, w, s));
            (
                VectorValue::Scalar {
                    scalar: s,
                    scalar_pretty: format_number(s),
                },
                None,
            )
        }
    };
    info!("vector {op}: {}", lines.last().map(String::as_str).unwrap_or(""));
    Ok(VectorOpResult {
        input: echo(request),
        steps: StepLog::flat(lines),
        result,
        diagram,
    })
}
