//! Polylines and their SVG path-data form.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Point;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path(pub Vec<Point>);

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Path(points)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathParseError {
    #[error("unsupported path command {0:?}")]
    UnsupportedCommand(String),
    #[error("path data must start with a move-to command")]
    MissingMoveTo,
    #[error("command {0:?} is missing its coordinate pair")]
    MissingCoordinates(String),
    #[error("invalid coordinate pair {0:?}")]
    InvalidCoordinates(String),
}

/// Joins two point sequences into one continuous path, `a` first.
pub fn compose(a: &[Point], b: &[Point]) -> Path {
    let mut points = Vec::with_capacity(a.len() + b.len());
    points.extend_from_slice(a);
    points.extend_from_slice(b);
    Path(points)
}

impl Path {
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Formats as `M x,y L x,y ...`. An empty path gives an empty string.
    ///
    /// Coordinates use the shortest representation that parses back to the same `f64`.
    pub fn to_svg_d(&self) -> String {
        let mut d = String::with_capacity(self.0.len() * 24);
        for (i, p) in self.0.iter().enumerate() {
            let command = if i == 0 { "M" } else { " L" };
            // Writing to a `String` cannot fail.
            let _ = write!(d, "{} {},{}", command, p.x, p.y);
        }
        d
    }

    /// Parses path data made of `M` and `L` commands with `x,y` pairs, as written by
    /// [`Path::to_svg_d`].
    pub fn from_svg_d(d: &str) -> Result<Path, PathParseError> {
        let mut points = Vec::new();
        let mut tokens = d.split_whitespace();
        while let Some(command) = tokens.next() {
            match command {
                "M" if points.is_empty() => {}
                "L" if !points.is_empty() => {}
                "L" => return Err(PathParseError::MissingMoveTo),
                _ => return Err(PathParseError::UnsupportedCommand(command.to_owned())),
            }
            let pair = tokens
                .next()
                .ok_or_else(|| PathParseError::MissingCoordinates(command.to_owned()))?;
            points.push(parse_pair(pair)?);
        }
        Ok(Path(points))
    }
}

fn parse_pair(pair: &str) -> Result<Point, PathParseError> {
    let invalid = || PathParseError::InvalidCoordinates(pair.to_owned());
    let (x, y) = pair.split_once(',').ok_or_else(invalid)?;
    let x = x.parse().map_err(|_| invalid())?;
    let y = y.parse().map_err(|_| invalid())?;
    Ok(Point { x, y })
}

/// A standalone SVG document holding `path` as `<path id="spiral">`, with the view box
/// centered on the spiral origin.
pub fn svg_document(path: &Path, view_size: f64, stroke_width: f64) -> String {
    let half = view_size / 2.0;
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{min} {min} {size} {size}" "#,
            r#"width="{size}" height="{size}">"#,
            "\n",
            r#"  <path id="spiral" fill="none" stroke="black" stroke-width="{stroke}" d="{d}"/>"#,
            "\n</svg>\n"
        ),
        min = -half,
        size = view_size,
        stroke = stroke_width,
        d = path.to_svg_d(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    #[test]
    fn test_to_svg_d() {
        let path = Path(pts(&[(0.0, 0.0), (1.5, -2.0), (3.0, 0.25)]));
        assert_eq!(path.to_svg_d(), "M 0,0 L 1.5,-2 L 3,0.25");
        assert_eq!(Path::default().to_svg_d(), "");
    }

    #[test]
    fn test_compose() {
        let a = pts(&[(1.0, 1.0), (2.0, 2.0)]);
        let b = pts(&[(3.0, 3.0)]);
        let path = compose(&a, &b);
        assert_eq!(path.points(), &pts(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)])[..]);
        assert_eq!(path.to_svg_d(), "M 1,1 L 2,2 L 3,3");

        assert!(compose(&[], &[]).is_empty());
        assert_eq!(compose(&[], &b).to_svg_d(), "M 3,3");
    }

    #[test]
    fn test_from_svg_d_round_trip() {
        let path = Path(pts(&[
            (0.1, 0.2),
            (-123.456789012345, 1e-9),
            (std::f64::consts::PI, -std::f64::consts::E),
        ]));
        assert_eq!(Path::from_svg_d(&path.to_svg_d()), Ok(path));
        assert_eq!(Path::from_svg_d("   "), Ok(Path::default()));
    }

    #[test]
    fn test_from_svg_d_errors() {
        const TEST_CASES: &[(&str, PathParseErrorKind)] = &[
            ("L 1,2", PathParseErrorKind::MissingMoveTo),
            ("M 1,2 M 3,4", PathParseErrorKind::UnsupportedCommand),
            ("M 1,2 C 3,4", PathParseErrorKind::UnsupportedCommand),
            ("M", PathParseErrorKind::MissingCoordinates),
            ("M 1,2 L", PathParseErrorKind::MissingCoordinates),
            ("M 1;2", PathParseErrorKind::InvalidCoordinates),
            ("M 1,x", PathParseErrorKind::InvalidCoordinates),
        ];
        for &(d, want) in TEST_CASES {
            let got = Path::from_svg_d(d);
            let kind = match &got {
                Err(PathParseError::UnsupportedCommand(_)) => PathParseErrorKind::UnsupportedCommand,
                Err(PathParseError::MissingMoveTo) => PathParseErrorKind::MissingMoveTo,
                Err(PathParseError::MissingCoordinates(_)) => PathParseErrorKind::MissingCoordinates,
                Err(PathParseError::InvalidCoordinates(_)) => PathParseErrorKind::InvalidCoordinates,
                Ok(_) => panic!("{:?}: parsed as {:?}", d, got),
            };
            if kind != want {
                panic!("{:?}: got {:?}, want {:?}", d, got, want);
            }
        }
    }

    #[derive(Debug, Copy, Clone, PartialEq)]
    enum PathParseErrorKind {
        UnsupportedCommand,
        MissingMoveTo,
        MissingCoordinates,
        InvalidCoordinates,
    }

    #[test]
    fn test_svg_document() {
        let path = Path(pts(&[(0.0, 0.0), (1.0, 1.0)]));
        let doc = svg_document(&path, 300.0, 0.5);
        assert!(doc.starts_with("<svg "), "{}", doc);
        assert!(doc.contains(r#"viewBox="-150 -150 300 300""#), "{}", doc);
        assert!(doc.contains(r#"stroke-width="0.5""#), "{}", doc);
        assert!(doc.contains(r#"<path id="spiral""#), "{}", doc);
        assert!(doc.contains(r#"d="M 0,0 L 1,1""#), "{}", doc);
        assert!(doc.trim_end().ends_with("</svg>"));
    }
}
