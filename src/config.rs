//! Engine options.
//!
//! The option enums parse from the same lowercase strings a form or request
//! carries (`"partial"`, `"deg"`, `"round"` ...). [`EngineOptions`] can also be
//! read from a TOML document:
//! ```toml
//! pivoting = "none"
//! angle_mode = "deg"
//! mode = "round"
//! tolerance = 1e-10
//! decimals_display = 4
//! precision = 28
//! loglevel = "info"
//! ```
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_analysis::decimal::{DecimalContext, MAX_PRECISION};
use crate::errors::{EngineError, EngineResult};
use crate::numeric::TOL;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Pivoting {
    /// first non-zero entry in the column
    None,
    /// largest absolute value in the column
    #[default]
    Partial,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Rad,
    Deg,
}

/// How the approximate interest is cut to `approx_decimals`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApproxMode {
    #[default]
    Trunc,
    Round,
}

/// Parse one of the option enums, turning strum's error into a validation error.
pub fn parse_option<T: FromStr>(name: &str, value: &str) -> EngineResult<T> {
    T::from_str(value.trim().to_lowercase().as_str())
        .map_err(|_| EngineError::validation(format!("unknown {name}: '{value}'")))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub pivoting: Pivoting,
    pub angle_mode: AngleMode,
    pub mode: ApproxMode,
    pub tolerance: f64,
    pub decimals_display: u32,
    /// significant digits for decimal arithmetic
    pub precision: u32,
    pub loglevel: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            pivoting: Pivoting::Partial,
            angle_mode: AngleMode::Rad,
            mode: ApproxMode::Trunc,
            tolerance: TOL,
            decimals_display: 6,
            precision: MAX_PRECISION,
            loglevel: Some("info".to_string()),
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let options: EngineOptions = toml::from_str(text)
            .map_err(|e| EngineError::validation(format!("invalid options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            EngineError::validation(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(EngineError::validation("tolerance must be positive"));
        }
        DecimalContext::new(self.precision)?;
        Ok(())
    }
}
