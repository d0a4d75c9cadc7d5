//! Geometric regions for gaze containment tests
//!
//! Regions are stateless value objects. A region answers whether a set of
//! points lies inside it under one of two aggregation policies
//! ([`ContainsMode::All`] or [`ContainsMode::Any`]).

use crate::types::{GazeError, Point, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How point-wise membership is aggregated over a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainsMode {
    /// Every point must be inside; an empty trajectory is contained
    #[default]
    All,
    /// At least one point must be inside; an empty trajectory is not contained
    Any,
}

impl FromStr for ContainsMode {
    type Err = GazeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ContainsMode::All),
            "any" => Ok(ContainsMode::Any),
            other => Err(GazeError::InvalidArgument(format!(
                "Unknown contains mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ContainsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainsMode::All => write!(f, "all"),
            ContainsMode::Any => write!(f, "any"),
        }
    }
}

/// Shared membership capability of every region shape
pub trait Contains {
    fn contains_point(&self, point: &Point) -> bool;

    fn contains(&self, trajectory: &[Point], mode: ContainsMode) -> bool {
        match mode {
            ContainsMode::All => trajectory.iter().all(|p| self.contains_point(p)),
            ContainsMode::Any => trajectory.iter().any(|p| self.contains_point(p)),
        }
    }
}

/// Circle centered at `(x, y)` with radius `r`, boundary included
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CircleParams")]
pub struct CircleRegion {
    x: f64,
    y: f64,
    r: f64,
}

#[derive(Deserialize)]
struct CircleParams {
    x: f64,
    y: f64,
    r: f64,
}

impl TryFrom<CircleParams> for CircleRegion {
    type Error = GazeError;

    fn try_from(p: CircleParams) -> Result<Self> {
        CircleRegion::new(p.x, p.y, p.r)
    }
}

impl CircleRegion {
    pub fn new(x: f64, y: f64, r: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && r.is_finite()) {
            return Err(GazeError::InvalidArgument(format!(
                "Circle region has non-finite parameters ({}, {}, {})",
                x, y, r
            )));
        }
        if r < 0.0 {
            return Err(GazeError::InvalidArgument(format!(
                "Circle region radius must not be negative: {}",
                r
            )));
        }
        Ok(Self { x, y, r })
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn radius(&self) -> f64 {
        self.r
    }
}

impl Contains for CircleRegion {
    fn contains_point(&self, point: &Point) -> bool {
        point.distance_to(&self.center()) <= self.r
    }
}

/// Axis-aligned rectangle, boundary included
///
/// Bounds are normalized on construction, so `left`/`right` and
/// `bottom`/`top` may be given in either order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RectParams")]
pub struct RectRegion {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

#[derive(Deserialize)]
struct RectParams {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl TryFrom<RectParams> for RectRegion {
    type Error = GazeError;

    fn try_from(p: RectParams) -> Result<Self> {
        RectRegion::new(p.left, p.right, p.bottom, p.top)
    }
}

impl RectRegion {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Result<Self> {
        if ![left, right, bottom, top].iter().all(|v| v.is_finite()) {
            return Err(GazeError::InvalidArgument(format!(
                "Rect region has non-finite bounds ({}, {}, {}, {})",
                left, right, bottom, top
            )));
        }
        Ok(Self {
            left: left.min(right),
            right: left.max(right),
            bottom: bottom.min(top),
            top: bottom.max(top),
        })
    }

    /// `(xmin, xmax, ymin, ymax)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.left, self.right, self.bottom, self.top)
    }
}

impl Contains for RectRegion {
    fn contains_point(&self, point: &Point) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.bottom..=self.top).contains(&point.y)
    }
}

/// Closed set of region shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Region {
    Circle(CircleRegion),
    Rect(RectRegion),
}

impl Region {
    pub fn circle(x: f64, y: f64, r: f64) -> Result<Self> {
        CircleRegion::new(x, y, r).map(Region::Circle)
    }

    pub fn rect(left: f64, right: f64, bottom: f64, top: f64) -> Result<Self> {
        RectRegion::new(left, right, bottom, top).map(Region::Rect)
    }
}

impl Contains for Region {
    fn contains_point(&self, point: &Point) -> bool {
        match self {
            Region::Circle(c) => c.contains_point(point),
            Region::Rect(r) => r.contains_point(point),
        }
    }
}

impl From<CircleRegion> for Region {
    fn from(c: CircleRegion) -> Self {
        Region::Circle(c)
    }
}

impl From<RectRegion> for Region {
    fn from(r: RectRegion) -> Self {
        Region::Rect(r)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Circle(c) => write!(f, "circle:{},{},{}", c.x, c.y, c.r),
            Region::Rect(r) => write!(f, "rect:{},{},{},{}", r.left, r.right, r.bottom, r.top),
        }
    }
}

/// Parses `circle:x,y,r` and `rect:left,right,bottom,top`
impl FromStr for Region {
    type Err = GazeError;

    fn from_str(s: &str) -> Result<Self> {
        let (shape, params) = s.split_once(':').ok_or_else(|| {
            GazeError::InvalidArgument(format!("Region must look like 'shape:params': {}", s))
        })?;

        let values = params
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| GazeError::InvalidArgument(format!("Bad region parameter in {}: {}", s, e)))?;

        match (shape.trim().to_lowercase().as_str(), values.as_slice()) {
            ("circle", [x, y, r]) => Region::circle(*x, *y, *r),
            ("rect", [left, right, bottom, top]) => Region::rect(*left, *right, *bottom, *top),
            _ => Err(GazeError::InvalidArgument(format!(
                "Unknown region shape or wrong parameter count: {}",
                s
            ))),
        }
    }
}
