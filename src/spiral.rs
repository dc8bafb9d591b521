//! Archimedean-like spiral stepping with pluggable radius perturbation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::math::{pi, polar, Point};

/// Per-point radius perturbation, evaluated at the unperturbed point. `None` leaves the
/// point alone; `Some(0.0)` is an ordinary (no-op) perturbation.
pub type Adjustment<'a> = &'a (dyn Fn(Point) -> Option<f64> + 'a);

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiralConfig<'a> {
    pub initial_angle: f64,
    pub initial_radius: f64,
    pub radius_offset: f64,
    /// Per-step radius offsets; one point is generated per element.
    pub adjustment_array: Option<Vec<f64>>,
    pub max_radius: Option<f64>,
    /// Number of turns; ignored when `max_angle` is set.
    pub loops: Option<f64>,
    pub max_angle: Option<f64>,
    /// Emit the points outermost first.
    pub reverse: bool,
    #[serde(skip)]
    pub adjustment: Option<Adjustment<'a>>,
}

impl std::fmt::Debug for SpiralConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpiralConfig")
            .field("initial_angle", &self.initial_angle)
            .field("initial_radius", &self.initial_radius)
            .field("radius_offset", &self.radius_offset)
            .field("adjustment_array", &self.adjustment_array)
            .field("max_radius", &self.max_radius)
            .field("loops", &self.loops)
            .field("max_angle", &self.max_angle)
            .field("reverse", &self.reverse)
            .field("adjustment", &self.adjustment.map(|_| "<fn>"))
            .finish()
    }
}

impl<'a> SpiralConfig<'a> {
    pub fn bounded_by_radius(max_radius: f64) -> Self {
        SpiralConfig {
            max_radius: Some(max_radius),
            ..SpiralConfig::default()
        }
    }

    pub fn bounded_by_angle(max_angle: f64) -> Self {
        SpiralConfig {
            max_angle: Some(max_angle),
            ..SpiralConfig::default()
        }
    }

    pub fn with_adjustment(self, adjustment: Adjustment<'a>) -> Self {
        SpiralConfig {
            adjustment: Some(adjustment),
            ..self
        }
    }

    pub fn reversed(self) -> Self {
        SpiralConfig {
            reverse: true,
            ..self
        }
    }

    /// Picks the stopping rule, in priority order: adjustment array, `max_radius`,
    /// `max_angle`, `loops`.
    pub fn termination(&self) -> Result<Termination, SpiralError> {
        fn finite(bound: f64) -> Result<f64, SpiralError> {
            if bound.is_finite() {
                Ok(bound)
            } else {
                Err(SpiralError::NonFiniteBound(bound))
            }
        }

        if let Some(offsets) = &self.adjustment_array {
            return Ok(Termination::Steps(offsets.len()));
        }
        if let Some(max_radius) = self.max_radius {
            return Ok(Termination::RadiusBound(finite(max_radius)?));
        }
        if let Some(max_angle) = self.max_angle {
            return Ok(Termination::AngleBound(finite(max_angle)?));
        }
        if let Some(loops) = self.loops {
            return Ok(Termination::AngleBound(finite(pi(2.0) * loops)?));
        }
        Err(SpiralError::MissingTermination)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Termination {
    /// Exactly this many steps.
    Steps(usize),
    /// While the base radius is below the bound.
    RadiusBound(f64),
    /// While the angle is below the bound.
    AngleBound(f64),
}

impl Termination {
    fn proceed(&self, step: usize, radius: f64, angle: f64) -> bool {
        match *self {
            Termination::Steps(n) => step < n,
            Termination::RadiusBound(max) => radius < max,
            Termination::AngleBound(max) => angle < max,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SpiralError {
    #[error("spiral config lacks a terminating condition")]
    MissingTermination,
    #[error("spiral bound must be finite, got {0}")]
    NonFiniteBound(f64),
}

/// Angular step taken from base radius `radius`. The base radius grows by `0.6` times this.
///
/// Past radius 50 the step shrinks so that points stay roughly evenly spaced along the curve.
pub fn step_increment(radius: f64) -> f64 {
    2.0 / f64::max(radius, 50.0)
}

pub fn generate(config: &SpiralConfig<'_>) -> Result<Vec<Point>, SpiralError> {
    let termination = config.termination()?;
    let offsets = config.adjustment_array.as_deref().unwrap_or(&[]);

    let mut angle = config.initial_angle;
    let mut radius = config.initial_radius;
    let mut points = Vec::new();
    let mut step = 0;
    while termination.proceed(step, radius, angle) {
        let r = radius + config.radius_offset + offsets.get(step).copied().unwrap_or(0.0);
        let mut p = polar(r, angle);
        if let Some(delta) = config.adjustment.and_then(|adjust| adjust(p)) {
            p = polar(r + delta, angle);
        }
        points.push(p);

        let inc = step_increment(radius);
        angle += inc;
        radius += 0.6 * inc;
        step += 1;
    }

    if config.reverse {
        points.reverse();
    }
    debug!(
        ?termination,
        points = points.len(),
        final_radius = radius,
        final_angle = angle,
        "generated spiral"
    );
    Ok(points)
}
