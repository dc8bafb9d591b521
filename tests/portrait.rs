use anyhow::Context;
use image::{Rgba, RgbaImage};
use raqote::{DrawOptions, DrawTarget, SolidSource, Source};

use spiral_portrait::art::{draw, draw_with_tone, Portrait};
use spiral_portrait::config::Config;
use spiral_portrait::math::Point;
use spiral_portrait::path::Path;
use spiral_portrait::sampler::EdgeMode;
use spiral_portrait::tone::ToneCurve;

/// Left half black, right half white.
fn split_canvas() -> RgbaImage {
    RgbaImage::from_fn(300, 300, |x, _| {
        if x < 150 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Pairs each `lower` point with the `upper` point generated on the same spiral step, and
/// returns `(base point, radial gap)` for each.
fn gaps(portrait: &Portrait) -> Vec<(Point, f64)> {
    portrait
        .lower
        .iter()
        .zip(portrait.upper.iter().rev())
        .map(|(lo, hi)| {
            let mid = Point::new((lo.x + hi.x) / 2.0, (lo.y + hi.y) / 2.0);
            (mid, hi.radius() - lo.radius())
        })
        .collect()
}

#[test]
fn dark_regions_spread_the_spirals() -> anyhow::Result<()> {
    let portrait = draw(&split_canvas(), &Config::default()).context("draw failed")?;

    let mut dark = 0;
    let mut light = 0;
    for (mid, gap) in gaps(&portrait) {
        let r = mid.radius();
        if !(10.0..100.0).contains(&r) || mid.x.abs() < 6.0 {
            continue;
        }
        if mid.x < 0.0 {
            dark += 1;
            assert!((gap - 3.2).abs() < 1e-6, "dark gap at {:?}: {}", mid, gap);
        } else {
            light += 1;
            let want = 2.0 * (0.2 + 1.4 * (1.0 - 0.93));
            assert!((gap - want).abs() < 1e-6, "light gap at {:?}: {}", mid, gap);
        }
    }
    assert!(dark > 100 && light > 100, "dark {} light {}", dark, light);
    Ok(())
}

#[test]
fn path_data_round_trips() -> anyhow::Result<()> {
    let portrait = draw(&split_canvas(), &Config::default())?;
    let d = portrait.path.to_svg_d();
    assert!(d.starts_with("M "));
    let parsed = Path::from_svg_d(&d).context("failed to re-parse path data")?;
    assert_eq!(parsed, portrait.path);
    Ok(())
}

#[test]
fn skip_edge_mode_leaves_rim_unperturbed() -> anyhow::Result<()> {
    let config = Config {
        edge_mode: EdgeMode::Skip,
        ..Config::default()
    };
    let portrait = draw(&split_canvas(), &config)?;
    // The outermost step samples beyond the canvas, so both spirals land on the same point.
    assert_eq!(portrait.lower.last(), portrait.upper.first());

    let transparent = draw(&split_canvas(), &Config::default())?;
    assert_ne!(transparent.lower.last(), transparent.upper.first());
    Ok(())
}

#[test]
fn tone_curve_is_shared_between_drawings() -> anyhow::Result<()> {
    let tone = ToneCurve::reference();
    let config = Config::default();
    let first = draw_with_tone(&split_canvas(), &tone, &config)?;
    let cached = tone.cached_buckets();
    assert!(cached > 0 && cached <= 101, "cached {}", cached);

    let second = draw_with_tone(&split_canvas(), &tone, &config)?;
    assert_eq!(tone.cached_buckets(), cached);
    assert_eq!(first.path, second.path);
    Ok(())
}

#[test]
fn draws_from_a_raqote_canvas() -> anyhow::Result<()> {
    let mut canvas = DrawTarget::new(300, 300);
    canvas.clear(SolidSource::from_unpremultiplied_argb(0xff, 0xff, 0xff, 0xff));
    canvas.fill_rect(
        0.0,
        0.0,
        150.0,
        300.0,
        &Source::Solid(SolidSource::from_unpremultiplied_argb(0xff, 0, 0, 0)),
        &DrawOptions::new(),
    );

    let from_raqote = draw(&canvas, &Config::default())?;
    let from_image = draw(&split_canvas(), &Config::default())?;
    assert_eq!(from_raqote.path, from_image.path);
    Ok(())
}

#[test]
fn config_file_drives_drawing() -> anyhow::Result<()> {
    let config: Config = serde_json::from_str(r#"{"maxRadiusFactor": 0.5, "sampleRadius": 1}"#)
        .context("failed to parse config")?;
    let portrait = draw(&split_canvas(), &config)?;
    let bound = config.max_radius();
    // Perturbations move points by a couple of pixels at most.
    for p in portrait.lower.iter().chain(&portrait.upper) {
        assert!(p.radius() < bound + 3.0, "{:?} beyond {}", p, bound);
    }
    let outermost = portrait.path.points().iter().map(Point::radius).fold(0.0, f64::max);
    assert!(outermost > bound - 3.0, "outermost point at {}", outermost);
    Ok(())
}
