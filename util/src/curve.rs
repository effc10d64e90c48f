//! Piecewise-linear response curves
//!
//! A [`Curve`] is an immutable lookup table of `(x, y)` control points with
//! precomputed segment slopes and intercepts. Curves are rebuilt whenever the
//! owning module changes mode, never mutated in place.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An immutable piecewise-linear function.
///
/// Between control points the value is linearly interpolated. Beyond either
/// end of the table the value holds at the nearest endpoint, the lookup never
/// extrapolates past its domain.
#[derive(Debug, Clone, Serialize)]
pub struct Curve {
    /// Control point x values, strictly monotonic in the scan direction.
    x: Vec<f64>,

    /// Control point y values, one per x.
    y: Vec<f64>,

    /// Per-segment slope, `slopes[i]` covers `x[i]..x[i+1]`.
    slopes: Vec<f64>,

    /// Per-segment intercept, `intercepts[i]` covers `x[i]..x[i+1]`.
    intercepts: Vec<f64>,

    /// Direction the x values run in.
    scan: Scan,
}

/// A step function over `(threshold, state)` pairs.
///
/// Lookup returns the state bound to the highest threshold not exceeding the
/// measurement, or `false` if the measurement is below every threshold.
#[derive(Debug, Clone, Serialize)]
pub struct StepTable {
    thresholds: Vec<f64>,
    states: Vec<bool>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction in which a curve's control points are ordered and scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scan {
    /// x values strictly increasing, indexed by a rising quantity (speed).
    Ascending,

    /// x values strictly decreasing, indexed by a falling quantity
    /// (friction).
    Descending,
}

/// Errors raised when constructing a curve or step table from parameters.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("A curve requires at least one control point")]
    Empty,

    #[error("Mismatched table lengths: {0} x values but {1} y values")]
    LengthMismatch(usize, usize),

    #[error(
        "Control points must be strictly {0:?} in x, but x[{1}] = {2} \
        breaks the ordering")]
    NotMonotonic(Scan, usize, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Curve {
    /// Build a curve whose x values strictly increase.
    pub fn ascending(x: &[f64], y: &[f64]) -> Result<Self, CurveError> {
        Self::new(x, y, Scan::Ascending)
    }

    /// Build a curve whose x values strictly decrease.
    pub fn descending(x: &[f64], y: &[f64]) -> Result<Self, CurveError> {
        Self::new(x, y, Scan::Descending)
    }

    fn new(x: &[f64], y: &[f64], scan: Scan) -> Result<Self, CurveError> {
        if x.is_empty() {
            return Err(CurveError::Empty);
        }
        if x.len() != y.len() {
            return Err(CurveError::LengthMismatch(x.len(), y.len()));
        }

        for i in 1..x.len() {
            let ordered = match scan {
                Scan::Ascending => x[i] > x[i - 1],
                Scan::Descending => x[i] < x[i - 1],
            };
            if !ordered {
                return Err(CurveError::NotMonotonic(scan, i, x[i]));
            }
        }

        // Precompute segment slopes and intercepts so evaluation is a scan
        // and a single multiply-add.
        let mut slopes = Vec::with_capacity(x.len().saturating_sub(1));
        let mut intercepts = Vec::with_capacity(x.len().saturating_sub(1));

        for i in 0..x.len().saturating_sub(1) {
            let slope = (y[i + 1] - y[i]) / (x[i + 1] - x[i]);
            slopes.push(slope);
            intercepts.push(y[i] - slope * x[i]);
        }

        Ok(Curve {
            x: x.to_vec(),
            y: y.to_vec(),
            slopes,
            intercepts,
            scan,
        })
    }

    /// Evaluate the curve at `value`.
    pub fn eval(&self, value: f64) -> f64 {
        for i in 0..self.x.len() {
            let within = match self.scan {
                Scan::Ascending => value <= self.x[i],
                Scan::Descending => value >= self.x[i],
            };

            if within {
                return if i == 0 {
                    self.y[0]
                } else {
                    self.slopes[i - 1] * value + self.intercepts[i - 1]
                };
            }
        }

        // Past the far end of the table, hold the last point
        self.y[self.x.len() - 1]
    }

    /// The y value of the first control point.
    pub fn first(&self) -> f64 {
        self.y[0]
    }

    /// True if every x and y entry is zero, i.e. the curve can never
    /// contribute anything.
    pub fn is_all_zero(&self) -> bool {
        self.x.iter().chain(self.y.iter()).all(|v| *v == 0.0)
    }
}

impl StepTable {
    /// Build a step table from parallel threshold/state arrays. Thresholds
    /// must strictly increase.
    pub fn new(thresholds: &[f64], states: &[bool]) -> Result<Self, CurveError> {
        if thresholds.is_empty() {
            return Err(CurveError::Empty);
        }
        if thresholds.len() != states.len() {
            return Err(CurveError::LengthMismatch(
                thresholds.len(),
                states.len(),
            ));
        }

        for i in 1..thresholds.len() {
            if thresholds[i] <= thresholds[i - 1] {
                return Err(CurveError::NotMonotonic(
                    Scan::Ascending,
                    i,
                    thresholds[i],
                ));
            }
        }

        Ok(StepTable {
            thresholds: thresholds.to_vec(),
            states: states.to_vec(),
        })
    }

    /// Look up the state for a measurement, scanning from the highest
    /// threshold down.
    pub fn lookup(&self, value: f64) -> bool {
        for i in (0..self.thresholds.len()).rev() {
            if value >= self.thresholds[i] {
                return self.states[i];
            }
        }

        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interpolation_through_points() {
        let curve = Curve::ascending(
            &[25.0, 70.0, 80.0, 95.0, 100.0],
            &[44.0, 42.0, 40.0, 35.0, 33.0],
        )
        .unwrap();

        // Interpolation must pass through every control point exactly
        for (x, y) in [(25.0, 44.0), (70.0, 42.0), (95.0, 35.0)] {
            assert_eq!(curve.eval(x), y);
        }
    }

    #[test]
    fn test_ascending_eval() {
        let curve = Curve::ascending(&[0.0, 100.0], &[10.0, 50.0]).unwrap();

        assert_eq!(curve.eval(50.0), 30.0);
        assert_eq!(curve.eval(-10.0), 10.0);
        assert_eq!(curve.eval(150.0), 50.0);
    }

    #[test]
    fn test_descending_eval() {
        // Friction-indexed correction table, x falling from full grip
        let curve = Curve::descending(
            &[60.0, 50.0, 40.0, 30.0],
            &[0.0, -0.1, -1.5, -2.0],
        )
        .unwrap();

        assert_eq!(curve.eval(70.0), 0.0);
        assert_eq!(curve.eval(45.0), (-0.1 + -1.5) / 2.0);
        assert_eq!(curve.eval(10.0), -2.0);
    }

    #[test]
    fn test_single_point_is_constant() {
        let curve = Curve::ascending(&[0.0], &[16.0]).unwrap();

        assert_eq!(curve.eval(-5.0), 16.0);
        assert_eq!(curve.eval(0.0), 16.0);
        assert_eq!(curve.eval(1000.0), 16.0);
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            Curve::ascending(&[], &[]),
            Err(CurveError::Empty)
        ));
        assert!(matches!(
            Curve::ascending(&[0.0, 1.0], &[0.0]),
            Err(CurveError::LengthMismatch(2, 1))
        ));
        assert!(matches!(
            Curve::ascending(&[0.0, 0.0], &[1.0, 2.0]),
            Err(CurveError::NotMonotonic(Scan::Ascending, 1, _))
        ));
        assert!(matches!(
            Curve::descending(&[60.0, 65.0], &[0.0, -1.0]),
            Err(CurveError::NotMonotonic(Scan::Descending, 1, _))
        ));
    }

    #[test]
    fn test_step_table() {
        let table = StepTable::new(
            &[0.0, 70.0, 88.0, 94.0],
            &[true, false, true, false],
        )
        .unwrap();

        assert_eq!(table.lookup(-1.0), false);
        assert_eq!(table.lookup(0.0), true);
        assert_eq!(table.lookup(69.9), true);
        assert_eq!(table.lookup(70.0), false);
        assert_eq!(table.lookup(90.0), true);
        assert_eq!(table.lookup(200.0), false);
    }
}
