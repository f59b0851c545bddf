//! Continuous domain → range scales.
//!
//! Three variants cover every mapping the layouts need:
//! - **Linear**: depth → x, leaf slot → y, count → angle
//! - **Power**: depth → radius (exponent 1 by default), `sqrt` value bars
//! - **Log**: value bars over domains spanning orders of magnitude
//!
//! A degenerate domain (zero width after transformation) is widened to one
//! unit before use, so no scale ever divides by zero or returns `NaN` for a
//! finite input.

use crate::tree::ValueBounds;

/// Smallest positive value fed to a log transform.
const LOG_FLOOR: f64 = 1e-9;

/// Transform applied before the linear interpolation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleKind {
    Linear,
    Log { base: f64 },
    Power { exponent: f64 },
}

impl ScaleKind {
    /// Parse a scale name as used in report bounds.
    ///
    /// Unknown names fall back to linear.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "log" | "log10" => ScaleKind::Log { base: 10.0 },
            "log2" => ScaleKind::Log { base: 2.0 },
            "ln" => ScaleKind::Log {
                base: std::f64::consts::E,
            },
            "sqrt" => ScaleKind::Power { exponent: 0.5 },
            _ => ScaleKind::Linear,
        }
    }

    fn forward(self, v: f64) -> f64 {
        match self {
            ScaleKind::Linear => v,
            ScaleKind::Log { base } => v.max(LOG_FLOOR).log(base),
            ScaleKind::Power { exponent } => v.signum() * v.abs().powf(exponent),
        }
    }

    fn backward(self, t: f64) -> f64 {
        match self {
            ScaleKind::Linear => t,
            ScaleKind::Log { base } => base.powf(t),
            ScaleKind::Power { exponent } => t.signum() * t.abs().powf(exponent.recip()),
        }
    }
}

/// A domain → range mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    kind: ScaleKind,
    range: [f64; 2],
    /// Transformed domain endpoints, widened if degenerate.
    t0: f64,
    t1: f64,
}

impl Scale {
    /// Create a scale of the given kind.
    pub fn new(kind: ScaleKind, domain: [f64; 2], range: [f64; 2]) -> Self {
        let t0 = kind.forward(domain[0]);
        let mut t1 = kind.forward(domain[1]);
        if !(t1 - t0).is_finite() || (t1 - t0).abs() < f64::EPSILON {
            t1 = t0 + 1.0;
        }
        Self {
            kind,
            range,
            t0,
            t1,
        }
    }

    /// Linear scale.
    pub fn linear(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self::new(ScaleKind::Linear, domain, range)
    }

    /// Power scale with the given exponent.
    pub fn power(exponent: f64, domain: [f64; 2], range: [f64; 2]) -> Self {
        Self::new(ScaleKind::Power { exponent }, domain, range)
    }

    /// Logarithmic scale with the given base.
    pub fn log(base: f64, domain: [f64; 2], range: [f64; 2]) -> Self {
        Self::new(ScaleKind::Log { base }, domain, range)
    }

    /// Build the value-bar scale described by report bounds.
    ///
    /// Returns `None` when the bounds carry no domain.
    pub fn from_value_bounds(bounds: &ValueBounds, range: [f64; 2]) -> Option<Self> {
        let domain = bounds.domain?;
        if !domain[0].is_finite() || !domain[1].is_finite() {
            return None;
        }
        let kind = bounds
            .scale
            .as_deref()
            .map_or(ScaleKind::Linear, ScaleKind::from_name);
        Some(Self::new(kind, domain, range))
    }

    /// Map a domain value into the range.
    pub fn apply(&self, x: f64) -> f64 {
        let t = (self.kind.forward(x) - self.t0) / (self.t1 - self.t0);
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    /// Map a range value back into the domain.
    pub fn invert(&self, y: f64) -> f64 {
        let span = self.range[1] - self.range[0];
        let t = if span.abs() < f64::EPSILON {
            0.0
        } else {
            (y - self.range[0]) / span
        };
        self.kind.backward(self.t0 + t * (self.t1 - self.t0))
    }
}
