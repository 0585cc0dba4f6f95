use std::str::FromStr;

use crate::error::{Error, GeometryError};
use crate::plane::Plane;
use crate::vector::{Point, Vector};

/// One of the three cardinal world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl FromStr for Axis {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(GeometryError::InvalidAxis(s.to_owned())),
        }
    }
}

/// Pair of world axes spanning a standard plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarAxes {
    XY,
    XZ,
    YZ,
}

impl PlanarAxes {
    /// The axis orthogonal to both spanning axes.
    pub fn normal(self) -> Axis {
        match self {
            PlanarAxes::XY => Axis::Z,
            PlanarAxes::XZ => Axis::Y,
            PlanarAxes::YZ => Axis::X,
        }
    }
}

impl FromStr for PlanarAxes {
    type Err = GeometryError;

    /// Order-insensitive: "zx" and "xz" name the same plane.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower.len() != 2 {
            return Err(GeometryError::InvalidAxes(s.to_owned()));
        }
        let has = |c: char| lower.contains(c);
        match (has('x'), has('y'), has('z')) {
            (true, true, false) => Ok(PlanarAxes::XY),
            (true, false, true) => Ok(PlanarAxes::XZ),
            (false, true, true) => Ok(PlanarAxes::YZ),
            _ => Err(GeometryError::InvalidAxes(s.to_owned())),
        }
    }
}

/// The three standard medical planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    pub fn axes(self) -> PlanarAxes {
        match self {
            // Looking down Z-axis
            Orientation::Axial => PlanarAxes::XY,
            // Looking down Y-axis
            Orientation::Coronal => PlanarAxes::XZ,
            // Looking down X-axis
            Orientation::Sagittal => PlanarAxes::YZ,
        }
    }
}

/// Rotation pivot or translation direction.
///
/// Cardinal axes rotate with the closed-form matrices, arbitrary vectors with
/// Rodrigues' formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Axis(Axis),
    Vector(Vector),
}

impl Direction {
    pub fn to_vector(self) -> Vector {
        match self {
            Direction::Axis(axis) => Vector::from_axis(axis),
            Direction::Vector(vector) => vector,
        }
    }
}

impl From<Axis> for Direction {
    fn from(axis: Axis) -> Self {
        Direction::Axis(axis)
    }
}

impl From<Vector> for Direction {
    fn from(vector: Vector) -> Self {
        Direction::Vector(vector)
    }
}

/// Scaling factor applied to both local axes or to each one separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Uniform(f64),
    Axes(f64, f64),
}

impl Scale {
    pub fn factors(self) -> (f64, f64) {
        match self {
            Scale::Uniform(factor) => (factor, factor),
            Scale::Axes(x, y) => (x, y),
        }
    }
}

impl From<f64> for Scale {
    fn from(factor: f64) -> Self {
        Scale::Uniform(factor)
    }
}

impl From<(f64, f64)> for Scale {
    fn from((x, y): (f64, f64)) -> Self {
        Scale::Axes(x, y)
    }
}

/// A position either in a local 2D frame or in 3D world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinates {
    Planar(f64, f64),
    Space(Point),
}

impl From<(f64, f64)> for Coordinates {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinates::Planar(x, y)
    }
}

impl From<Point> for Coordinates {
    fn from(point: Point) -> Self {
        Coordinates::Space(point)
    }
}

impl TryFrom<&[f64]> for Coordinates {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match *values {
            [x, y] => Ok(Coordinates::Planar(x, y)),
            [x, y, z] => Ok(Coordinates::Space(Point::new(x, y, z))),
            _ => Err(Error::Argument(format!(
                "expected 2 or 3 coordinates, got {}",
                values.len()
            ))),
        }
    }
}

/// One dimension of a requested section image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    Pixels(usize),
    Millimeters(f64),
}

impl From<usize> for Extent {
    fn from(pixels: usize) -> Self {
        Extent::Pixels(pixels)
    }
}

impl From<f64> for Extent {
    fn from(mm: f64) -> Self {
        Extent::Millimeters(mm)
    }
}

/// Size of a section image, in output pixels or in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageSize {
    Pixels { width: usize, height: usize },
    Millimeters { width: f64, height: f64 },
}

impl From<(usize, usize)> for ImageSize {
    fn from((width, height): (usize, usize)) -> Self {
        ImageSize::Pixels { width, height }
    }
}

impl From<(f64, f64)> for ImageSize {
    fn from((width, height): (f64, f64)) -> Self {
        ImageSize::Millimeters { width, height }
    }
}

impl TryFrom<(Extent, Extent)> for ImageSize {
    type Error = Error;

    fn try_from(extents: (Extent, Extent)) -> Result<Self, Self::Error> {
        match extents {
            (Extent::Pixels(width), Extent::Pixels(height)) => {
                Ok(ImageSize::Pixels { width, height })
            }
            (Extent::Millimeters(width), Extent::Millimeters(height)) => {
                Ok(ImageSize::Millimeters { width, height })
            }
            mixed => Err(Error::Argument(format!(
                "image size must be all pixels or all millimeters, got {mixed:?}"
            ))),
        }
    }
}

/// What to test a slice against in [`crate::slice::Slice::intersects`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Z(f64),
    Planar(f64, f64),
    Space(Point),
    Plane(Plane),
}

impl From<f64> for Target {
    fn from(z: f64) -> Self {
        Target::Z(z)
    }
}

impl From<(f64, f64)> for Target {
    fn from((x, y): (f64, f64)) -> Self {
        Target::Planar(x, y)
    }
}

impl From<Point> for Target {
    fn from(point: Point) -> Self {
        Target::Space(point)
    }
}

impl From<Plane> for Target {
    fn from(plane: Plane) -> Self {
        Target::Plane(plane)
    }
}

/// How to look up a slice in [`crate::volume::Volume::at`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Locator {
    Index(usize),
    Z(f64),
    Space(Point),
}

impl From<usize> for Locator {
    fn from(index: usize) -> Self {
        Locator::Index(index)
    }
}

impl From<f64> for Locator {
    fn from(z: f64) -> Self {
        Locator::Z(z)
    }
}

impl From<Point> for Locator {
    fn from(point: Point) -> Self {
        Locator::Space(point)
    }
}
