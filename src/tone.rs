//! Tone curves for reshaping normalized pixel intensity.
//!
//! A [`ToneCurve`] is built by composing small curve combinators (a harsh S-curve, a
//! lightness shift and a blend with the identity) and then memoizing the result over a
//! quantized domain, so that repeated lookups from neighboring pixels skip the `atan`.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{clamp01, pi};

/// S-curve sharpening contrast around the midpoint. Maps `[0, 1]` into `[0, 1]`.
pub fn harsh_contrast(x: f64) -> f64 {
    clamp01((f64::atan(5.0 * (2.0 * x - 1.0)) + pi(0.5)) * 1.2 / PI - 0.1)
}

/// Shifts the output of `curve` by `amount`, clamped to the unit interval.
pub fn lightness_adjust<F>(curve: F, amount: f64) -> impl Fn(f64) -> f64
where
    F: Fn(f64) -> f64,
{
    move |x| clamp01(curve(x) + amount)
}

/// Blends `curve` with the identity: `0.0` does no adjustment, `1.0` is the full curve.
pub fn variable_contrast_adjust<F>(curve: F, amount: f64) -> impl Fn(f64) -> f64
where
    F: Fn(f64) -> f64,
{
    move |x| amount * curve(x) + (1.0 - amount) * x
}

/// Caches a function on buckets of width `precision`.
///
/// An input `x` falls in bucket `floor(x / precision)` and every input of a bucket gets the
/// value of the function at the bucket's lower edge. The cache only ever grows. Two threads
/// missing on the same bucket both evaluate the function; the first insert wins.
pub struct Memoized<F> {
    curve: F,
    precision: f64,
    memo: RwLock<HashMap<i64, f64>>,
}

impl<F> Memoized<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(curve: F, precision: f64) -> Self {
        Memoized {
            curve,
            precision,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn bucket(&self, x: f64) -> i64 {
        (x / self.precision).floor() as i64
    }

    /// NaN has no bucket; it goes straight to the function and is never cached.
    pub fn get(&self, x: f64) -> f64 {
        if x.is_nan() {
            return (self.curve)(x);
        }
        let bucket = self.bucket(x);
        // The map is never left half-written, so a poisoned lock is still usable.
        if let Some(&value) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&bucket)
        {
            return value;
        }
        let value = (self.curve)(bucket as f64 * self.precision);
        *self
            .memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(bucket)
            .or_insert(value)
    }

    /// Number of buckets evaluated so far.
    pub fn len(&self) -> usize {
        self.memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, clap::Args)]
#[serde(default, rename_all = "camelCase")]
pub struct ToneCurveParams {
    /// Brightness shift applied after the harsh contrast curve.
    #[clap(long, default_value_t = -0.1, allow_negative_numbers = true)]
    pub lightness: f64,

    /// Strength of the contrast curve, from 0 (identity) to 1 (full curve).
    #[clap(long, default_value_t = 0.7)]
    pub contrast: f64,

    /// Bucket width of the tone curve cache.
    #[clap(long = "tone-precision", default_value_t = 0.01)]
    pub precision: f64,
}

impl Default for ToneCurveParams {
    fn default() -> Self {
        ToneCurveParams {
            lightness: -0.1,
            contrast: 0.7,
            precision: 0.01,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ToneCurveError {
    #[error("tone curve precision must be positive and finite, got {0}")]
    InvalidPrecision(f64),
}

type Curve = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// The memoized contrast pipeline applied to every sampled pixel.
///
/// Construct once per session and share it (e.g. via `Arc`) between samplers; the cache is
/// safe to hit from several threads at once.
pub struct ToneCurve {
    params: ToneCurveParams,
    memo: Memoized<Curve>,
}

impl std::fmt::Debug for ToneCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneCurve")
            .field("params", &self.params)
            .field("cached_buckets", &self.memo.len())
            .finish()
    }
}

impl Default for ToneCurve {
    fn default() -> Self {
        ToneCurve::reference()
    }
}

impl ToneCurve {
    pub fn new(params: ToneCurveParams) -> Result<Self, ToneCurveError> {
        if !(params.precision.is_finite() && params.precision > 0.0) {
            return Err(ToneCurveError::InvalidPrecision(params.precision));
        }
        Ok(ToneCurve::build(params))
    }

    /// Lightness `-0.1`, contrast `0.7`, precision `0.01`.
    pub fn reference() -> Self {
        ToneCurve::build(ToneCurveParams::default())
    }

    fn build(params: ToneCurveParams) -> Self {
        let curve: Curve = Box::new(variable_contrast_adjust(
            lightness_adjust(harsh_contrast, params.lightness),
            params.contrast,
        ));
        ToneCurve {
            params,
            memo: Memoized::new(curve, params.precision),
        }
    }

    pub fn params(&self) -> &ToneCurveParams {
        &self.params
    }

    pub fn adjust(&self, intensity: f64) -> f64 {
        self.memo.get(intensity)
    }

    pub fn cached_buckets(&self) -> usize {
        self.memo.len()
    }
}
