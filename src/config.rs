use serde::{Deserialize, Serialize};

use crate::math::Point;
use crate::sampler::{EdgeMode, SamplerConfig};
use crate::tone::ToneCurveParams;

#[derive(Debug, Copy, Clone, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Side of the square canvas the image is stretched onto, in pixels. The spiral is
    /// centered on it.
    #[clap(long, default_value_t = 300)]
    pub canvas_size: u32,

    /// Spirals run out to this multiple of the canvas half-diagonal.
    #[clap(long, default_value_t = 1.1)]
    pub max_radius_factor: f64,

    /// Half-width of the pixel window averaged around each spiral point.
    #[clap(long, default_value_t = 2)]
    pub sample_radius: u32,

    /// How sample windows read pixels beyond the canvas.
    #[clap(long, value_enum, default_value_t = EdgeMode::Transparent)]
    pub edge_mode: EdgeMode,

    /// Stroke width of the rendered path, in canvas pixels.
    #[clap(long, default_value_t = 0.5)]
    pub stroke_width: f64,

    #[clap(flatten)]
    pub tone: ToneCurveParams,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            canvas_size: 300,
            max_radius_factor: 1.1,
            sample_radius: 2,
            edge_mode: EdgeMode::Transparent,
            stroke_width: 0.5,
            tone: ToneCurveParams::default(),
        }
    }
}

impl Config {
    pub fn half_size(&self) -> f64 {
        self.canvas_size as f64 / 2.0
    }

    pub fn max_radius(&self) -> f64 {
        self.half_size() * self.max_radius_factor * f64::sqrt(2.0)
    }

    pub fn sampler(&self) -> SamplerConfig {
        let half = self.half_size();
        SamplerConfig {
            sample_radius: self.sample_radius,
            origin: Point::new(half, half),
            edge_mode: self.edge_mode,
        }
    }
}
