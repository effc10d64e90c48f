//! # Clearance elevation calibrator
//!
//! The stabiliser and air shock both need to know the elevation reading that
//! separates "driving on the surface" from "airborne". Rather than asking
//! the driver to measure it, elevation samples are collected while the
//! vehicle is being driven straight under power, and the clearance
//! thresholds are set from the sample median plus per-consumer margins.
//! Explicitly configured thresholds skip calibration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::{
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the clearance elevation calibrator.
#[derive(Debug, Deserialize)]
pub struct Params {
    /// Number of elevation samples the median is taken over.
    pub num_samples: usize,

    /// Margin added to the median for the stabiliser clearance.
    ///
    /// Units: meters
    pub stab_margin_m: f64,

    /// Margin added to the median for the air shock clearance.
    ///
    /// Units: meters
    pub shock_margin_m: f64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            num_samples: 21,
            stab_margin_m: 0.3,
            shock_margin_m: 1.3,
        }
    }
}

/// Clearance elevation calibrator state
#[derive(Default)]
pub struct ElevCal {
    pub(crate) params: Params,

    /// Thresholds configured explicitly, which win over calibration.
    stab_override_m: Option<f64>,
    shock_override_m: Option<f64>,

    /// Elevation samples collected so far.
    samples_m: Vec<f64>,

    /// True once the clearances have been produced.
    done: bool,
}

/// Input data to the calibrator.
#[derive(Default)]
pub struct InputData {
    /// Forward stick deflection, -1 to +1.
    pub fwd_stick: f64,

    /// Lateral stick deflection, -1 to +1.
    pub lat_stick: f64,

    /// Elevation above the reference surface.
    ///
    /// Units: meters
    pub elevation_m: f64,
}

/// Output from the calibrator.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// The clearances, produced exactly once when calibration completes.
    pub clearances: Option<Clearances>,
}

/// Clearance elevations for the modules that need them.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct Clearances {
    /// Units: meters
    pub stab_m: f64,

    /// Units: meters
    pub shock_m: f64,
}

/// Status report for calibrator processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Samples collected so far.
    pub num_samples: usize,

    /// True once calibration is complete.
    pub done: bool,
}

/// Possible errors that can occur during calibrator operation.
#[derive(Debug, thiserror::Error)]
pub enum ElevCalError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ElevCal {
    /// Path to the parameter file and the explicitly configured stabiliser
    /// and air shock clearances.
    type InitData = (&'static str, Option<f64>, Option<f64>);
    type InitError = ElevCalError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ElevCalError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let (param_file, stab_override_m, shock_override_m) = init_data;

        self.params = params::load(param_file)?;
        self.stab_override_m = stab_override_m;
        self.shock_override_m = shock_override_m;
        self.samples_m = Vec::with_capacity(self.params.num_samples);
        self.done = false;

        Ok(())
    }

    /// Perform cyclic processing of the calibrator.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if self.done {
            return Ok((
                OutputData::default(),
                StatusReport {
                    num_samples: self.samples_m.len(),
                    done: true,
                },
            ));
        }

        // Both thresholds configured: nothing to measure
        if let (Some(stab_m), Some(shock_m)) =
            (self.stab_override_m, self.shock_override_m)
        {
            return Ok((self.finish(stab_m, shock_m), self.report()));
        }

        if self.samples_m.len() >= self.params.num_samples {
            let mut sorted = self.samples_m.clone();
            sorted.sort_by(|a, b| {
                a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
            });
            let median_m = sorted[sorted.len() / 2];

            let stab_m = self
                .stab_override_m
                .unwrap_or(median_m + self.params.stab_margin_m);
            let shock_m = self
                .shock_override_m
                .unwrap_or(median_m + self.params.shock_margin_m);

            return Ok((self.finish(stab_m, shock_m), self.report()));
        }

        // Only sample while driving straight under power, anything else
        // (cornering, coasting, falling) poisons the surface estimate
        if input_data.fwd_stick > 0.0 && input_data.lat_stick == 0.0 {
            self.samples_m.push(input_data.elevation_m);
        }

        Ok((OutputData::default(), self.report()))
    }
}

impl ElevCal {
    fn finish(&mut self, stab_m: f64, shock_m: f64) -> OutputData {
        self.done = true;
        self.samples_m.clear();

        OutputData {
            clearances: Some(Clearances { stab_m, shock_m }),
        }
    }

    fn report(&self) -> StatusReport {
        StatusReport {
            num_samples: self.samples_m.len(),
            done: self.done,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn driving_input(elevation_m: f64) -> InputData {
        InputData {
            fwd_stick: 1.0,
            lat_stick: 0.0,
            elevation_m,
        }
    }

    fn make_cal(stab: Option<f64>, shock: Option<f64>) -> ElevCal {
        let mut cal = ElevCal::default();
        cal.params = Params {
            num_samples: 5,
            stab_margin_m: 0.3,
            shock_margin_m: 1.3,
        };
        cal.stab_override_m = stab;
        cal.shock_override_m = shock;
        cal
    }

    #[test]
    fn test_median_plus_margins() {
        let mut cal = make_cal(None, None);

        for elev in [1.0, 1.2, 0.9, 5.0, 1.1] {
            let (out, _) = cal.proc(&driving_input(elev)).unwrap();
            assert!(out.clearances.is_none());
        }

        // One more cycle to produce the result
        let (out, report) = cal.proc(&driving_input(1.0)).unwrap();
        let clearances = out.clearances.unwrap();
        assert!(report.done);

        // Median 1.1, margins 0.3 and 1.3. The outlier from the jump in the
        // sample run doesn't move the median.
        assert!((clearances.stab_m - 1.4).abs() < 1e-9);
        assert!((clearances.shock_m - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_samples_only_while_driving_straight() {
        let mut cal = make_cal(None, None);

        let mut cornering = driving_input(1.0);
        cornering.lat_stick = 0.5;

        let (_, report) = cal.proc(&cornering).unwrap();
        assert_eq!(report.num_samples, 0);

        let mut coasting = driving_input(1.0);
        coasting.fwd_stick = 0.0;

        let (_, report) = cal.proc(&coasting).unwrap();
        assert_eq!(report.num_samples, 0);
    }

    #[test]
    fn test_explicit_overrides_skip_calibration() {
        let mut cal = make_cal(Some(3.0), Some(4.0));

        let (out, report) = cal.proc(&driving_input(1.0)).unwrap();
        let clearances = out.clearances.unwrap();
        assert!(report.done);
        assert_eq!(clearances.stab_m, 3.0);
        assert_eq!(clearances.shock_m, 4.0);

        // Result is produced exactly once
        let (out, _) = cal.proc(&driving_input(1.0)).unwrap();
        assert!(out.clearances.is_none());
    }
}
