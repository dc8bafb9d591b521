use raqote::{DrawOptions, DrawTarget, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::config::Config;
use super::math::Point;
use super::path::{compose, Path};
use super::sampler::{PixelSampler, PixelSource, SamplerError};
use super::spiral::{self, SpiralConfig, SpiralError};
use super::tone::{ToneCurve, ToneCurveError};

#[derive(Debug, Error)]
pub enum DrawError {
    #[error(transparent)]
    ToneCurve(#[from] ToneCurveError),
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    #[error(transparent)]
    Spiral(#[from] SpiralError),
}

/// Two mirrored spirals tracing an image, and the single path joining them.
#[derive(Debug, Clone, Serialize)]
pub struct Portrait {
    pub canvas_size: u32,
    /// Spiral pushed inward by dark pixels, center first.
    pub lower: Vec<Point>,
    /// Spiral pushed outward by dark pixels, rim first.
    pub upper: Vec<Point>,
    /// `lower` followed by `upper`; the two meet at the rim.
    pub path: Path,
}

pub fn draw<S>(source: &S, config: &Config) -> Result<Portrait, DrawError>
where
    S: PixelSource + ?Sized,
{
    let tone = ToneCurve::new(config.tone)?;
    draw_with_tone(source, &tone, config)
}

/// Like [`draw`], reusing an existing tone curve (and its cache).
pub fn draw_with_tone<S>(
    source: &S,
    tone: &ToneCurve,
    config: &Config,
) -> Result<Portrait, DrawError>
where
    S: PixelSource + ?Sized,
{
    if (source.width(), source.height()) != (config.canvas_size, config.canvas_size) {
        warn!(
            width = source.width(),
            height = source.height(),
            canvas_size = config.canvas_size,
            "pixel source does not match the canvas"
        );
    }

    let sampler = PixelSampler::new(source, tone, config.sampler())?;
    let shrink = |p| sampler.sample_negated(p);
    let grow = |p| sampler.sample(p);
    let max_radius = config.max_radius();

    let lower =
        spiral::generate(&SpiralConfig::bounded_by_radius(max_radius).with_adjustment(&shrink))?;
    let upper = spiral::generate(
        &SpiralConfig::bounded_by_radius(max_radius)
            .with_adjustment(&grow)
            .reversed(),
    )?;
    let path = compose(&lower, &upper);

    info!(
        points = path.len(),
        max_radius,
        cached_buckets = tone.cached_buckets(),
        "drew spiral portrait"
    );
    Ok(Portrait {
        canvas_size: config.canvas_size,
        lower,
        upper,
        path,
    })
}

impl Portrait {
    /// Strokes the path in black on white, scaling the canvas to `width` pixels square.
    pub fn rasterize(&self, width: i32, stroke_width: f64) -> DrawTarget {
        let mut dt = DrawTarget::new(width, width);
        dt.clear(SolidSource::from_unpremultiplied_argb(0xff, 0xff, 0xff, 0xff));

        let half = self.canvas_size as f64 / 2.0;
        let scale = width as f64 / self.canvas_size as f64;
        let mut pb = PathBuilder::new();
        for (i, p) in self.path.points().iter().enumerate() {
            let x = ((p.x + half) * scale) as f32;
            let y = ((p.y + half) * scale) as f32;
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }
        let path = pb.finish();

        dt.stroke(
            &path,
            &Source::Solid(SolidSource::from_unpremultiplied_argb(0xff, 0, 0, 0)),
            &StrokeStyle {
                width: (stroke_width * scale) as f32,
                join: LineJoin::Round,
                ..StrokeStyle::default()
            },
            &DrawOptions::new(),
        );
        dt
    }
}
