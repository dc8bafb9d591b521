//! Disk-weighted brightness sampling over a borrowed pixel source.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::math::{dist, Point};
use crate::tone::ToneCurve;

/// Read-only RGBA pixels addressed by integer buffer coordinates.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Straight (non-premultiplied) RGBA at `(x, y)`, or `None` outside the buffer.
    fn rgba(&self, x: i64, y: i64) -> Option<[u8; 4]>;
}

fn locate(width: u32, height: u32, x: i64, y: i64) -> Option<(u32, u32)> {
    let x = u32::try_from(x).ok().filter(|&x| x < width)?;
    let y = u32::try_from(y).ok().filter(|&y| y < height)?;
    Some((x, y))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PixelBufferError {
    #[error("{width}x{height} RGBA buffer needs {expected} bytes, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A borrowed, row-major RGBA byte buffer (4 bytes per pixel).
#[derive(Debug, Copy, Clone)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, PixelBufferError> {
        let expected = 4 * width as usize * height as usize;
        if data.len() != expected {
            return Err(PixelBufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelBuffer {
            data,
            width,
            height,
        })
    }
}

impl PixelSource for PixelBuffer<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rgba(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        let (x, y) = locate(self.width, self.height, x, y)?;
        let k = 4 * (y as usize * self.width as usize + x as usize);
        let px = &self.data[k..k + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl PixelSource for image::RgbaImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }

    fn rgba(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        let (x, y) = locate(PixelSource::width(self), PixelSource::height(self), x, y)?;
        Some(self.get_pixel(x, y).0)
    }
}

/// Reads a raqote canvas, undoing its premultiplied ARGB storage.
impl PixelSource for raqote::DrawTarget {
    fn width(&self) -> u32 {
        raqote::DrawTarget::width(self).max(0) as u32
    }

    fn height(&self) -> u32 {
        raqote::DrawTarget::height(self).max(0) as u32
    }

    fn rgba(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        let width = PixelSource::width(self);
        let (x, y) = locate(width, PixelSource::height(self), x, y)?;
        let px = self.get_data()[y as usize * width as usize + x as usize];
        let [b, g, r, a] = px.to_le_bytes();
        if a == 0 {
            return Some([0, 0, 0, 0]);
        }
        let unpremultiply = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
        Some([unpremultiply(r), unpremultiply(g), unpremultiply(b), a])
    }
}

/// What a sample window sees where it leaves the pixel source.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeMode {
    /// Out-of-range pixels read as transparent black, like an HTML canvas.
    #[default]
    Transparent,
    /// Out-of-range pixels repeat the nearest edge pixel.
    Clamp,
    /// Any out-of-range pixel cancels the whole sample (no perturbation).
    Skip,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplerConfig {
    /// Half-width of the square sample window.
    pub sample_radius: u32,
    /// Buffer coordinates of the spiral's origin.
    pub origin: Point,
    pub edge_mode: EdgeMode,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            sample_radius: 2,
            origin: Point::new(150.0, 150.0),
            edge_mode: EdgeMode::Transparent,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("sample radius must be at least 1")]
    ZeroRadius,
}

/// Maps the brightness around a spiral point to a radius perturbation.
///
/// A uniformly black window gives `1.6` and a uniformly white one about `0.3`.
pub struct PixelSampler<'a, S: PixelSource + ?Sized> {
    source: &'a S,
    tone: &'a ToneCurve,
    config: SamplerConfig,
    weights: Vec<f64>,
}

impl<'a, S: PixelSource + ?Sized> PixelSampler<'a, S> {
    pub fn new(
        source: &'a S,
        tone: &'a ToneCurve,
        config: SamplerConfig,
    ) -> Result<Self, SamplerError> {
        if config.sample_radius == 0 {
            return Err(SamplerError::ZeroRadius);
        }
        Ok(PixelSampler {
            source,
            tone,
            config,
            weights: proximity_weights(config.sample_radius),
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Buffer coordinates of the top-left pixel of the window sampled for `p`.
    pub fn window_origin(&self, p: Point) -> (i64, i64) {
        let r = self.config.sample_radius as f64;
        // `as` truncates toward zero, matching canvas integer coordinates.
        (
            (p.x - r + self.config.origin.x) as i64,
            (p.y - r + self.config.origin.y) as i64,
        )
    }

    pub fn sample(&self, p: Point) -> Option<f64> {
        let size = window_size(self.config.sample_radius);
        let (left, top) = self.window_origin(p);
        let mut count = 0.0;
        let mut sum = 0.0;
        for i in 0..size {
            for j in 0..size {
                let proximity = self.weights[i * size + j];
                let x = left.saturating_add(j as i64);
                let y = top.saturating_add(i as i64);
                let [r, g, b, _] = self.pixel(x, y)?;
                let measure = (r as f64 + g as f64 + b as f64) / (3.0 * 255.0);
                count += proximity;
                sum += proximity * self.tone.adjust(measure);
            }
        }
        if count == 0.0 {
            return None;
        }
        Some(0.2 + 1.4 * (1.0 - sum / count))
    }

    /// [`Self::sample`] with the sign flipped, for the mirrored spiral.
    pub fn sample_negated(&self, p: Point) -> Option<f64> {
        self.sample(p).map(|delta| -delta)
    }

    fn pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if let Some(px) = self.source.rgba(x, y) {
            return Some(px);
        }
        trace!(x, y, edge_mode = ?self.config.edge_mode, "sample outside pixel source");
        match self.config.edge_mode {
            EdgeMode::Transparent => Some([0, 0, 0, 0]),
            EdgeMode::Clamp => {
                let max_x = (self.source.width() as i64 - 1).max(0);
                let max_y = (self.source.height() as i64 - 1).max(0);
                self.source.rgba(x.clamp(0, max_x), y.clamp(0, max_y))
            }
            EdgeMode::Skip => None,
        }
    }
}

fn window_size(sample_radius: u32) -> usize {
    2 * sample_radius as usize + 1
}

/// Linear falloff weights for a window, row-major.
///
/// Distances are measured from the window's first pixel rather than its center, and weights
/// are not clamped, so pixels farther than `sample_radius` from it count negatively.
pub fn proximity_weights(sample_radius: u32) -> Vec<f64> {
    let size = window_size(sample_radius);
    let radius = sample_radius as f64;
    let mut weights = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            let d = dist(Point::new(i as f64, j as f64), Point::ORIGIN);
            weights.push((radius - d) / radius);
        }
    }
    weights
}
