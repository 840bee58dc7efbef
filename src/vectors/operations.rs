use serde::Serialize;

use crate::errors::{EngineError, EngineResult};
use crate::numeric::{format_number, vec_pretty};

pub fn add(u: &[f64], v: &[f64]) -> Vec<f64> {
    u.iter().zip(v).map(|(a, b)| a + b).collect()
}

pub fn sub(u: &[f64], v: &[f64]) -> Vec<f64> {
    u.iter().zip(v).map(|(a, b)| a - b).collect()
}

pub fn scale(c: f64, u: &[f64]) -> Vec<f64> {
    u.iter().map(|x| c * x).collect()
}

pub fn dot(u: &[f64], v: &[f64]) -> f64 {
    u.iter().zip(v).map(|(a, b)| a * b).sum()
}

/// All vectors must have the length of the first one.
pub fn same_dim(operation: &str, vectors: &[(&str, &[f64])]) -> EngineResult<usize> {
    let Some(&(first_name, first)) = vectors.first() else {
        return Err(EngineError::validation(format!("{operation} needs vectors")));
    };
    let n = first.len();
    if n == 0 {
        return Err(EngineError::validation(format!("vector {first_name} is empty")));
    }
    for (name, v) in &vectors[1..] {
        if v.len() != n {
            return Err(EngineError::dimension(
                operation,
                format!(
                    "{first_name} has {n} components but {name} has {}",
                    v.len()
                ),
            ));
        }
    }
    Ok(n)
}

/// An arrow from the origin, for 2D/3D drawings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    pub label: String,
    pub from: Vec<f64>,
    pub to: Vec<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub emphasis: bool,
}

impl Arrow {
    fn new(label: impl Into<String>, to: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            from: vec![0.0; to.len()],
            to,
            emphasis: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Diagram {
    pub vectors: Vec<Arrow>,
}

/// Operands and scalars that end up in a diagram; the scaled arrows `c·u`
/// and `d·v` are added when the scalar is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramParts<'a> {
    pub u: Option<&'a [f64]>,
    pub v: Option<&'a [f64]>,
    pub w: Option<&'a [f64]>,
    pub c: Option<f64>,
    pub d: Option<f64>,
}

pub fn diagram_for(parts: DiagramParts<'_>, result: &[f64]) -> Diagram {
    let mut vectors = Vec::new();
    for (label, v) in [("u", parts.u), ("v", parts.v), ("w", parts.w)] {
        if let Some(v) = v {
            vectors.push(Arrow::new(label, v.to_vec()));
        }
    }
    if let (Some(c), Some(u)) = (parts.c, parts.u) {
        vectors.push(Arrow::new(format!("{}·u", format_number(c)), scale(c, u)));
    }
    if let (Some(d), Some(v)) = (parts.d, parts.v) {
        vectors.push(Arrow::new(format!("{}·v", format_number(d)), scale(d, v)));
    }
    let mut res = Arrow::new("result", result.to_vec());
    res.emphasis = true;
    vectors.push(res);
    Diagram { vectors }
}

/// `1·4 + 2·5 + 3·6 = 32`
pub fn dot_line(u: &[f64], v: &[f64], value: f64) -> String {
    let terms: Vec<String> = u
        .iter()
        .zip(v)
        .map(|(&a, &b)| format!("{}·{}", format_number(a), format_number(b)))
        .collect();
    format!("{} = {}", terms.join(" + "), format_number(value))
}

pub fn scaled_line(name: &str, scalar_name: &str, c: f64, u: &[f64], r: &[f64]) -> String {
    format!(
        "{scalar_name}·{name} = {} · {} = {}",
        format_number(c),
        vec_pretty(u),
        vec_pretty(r)
    )
}
