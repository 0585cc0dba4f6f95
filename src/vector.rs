//! Free vectors and world-space points.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use ndarray::{Array1, Array2, arr1, arr2};

use crate::enums::{Axis, Direction};
use crate::plane::Plane;

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// A free vector in world space. Has no position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

impl Vector {
    pub const fn new(i: f64, j: f64, k: f64) -> Self {
        Self { i, j, k }
    }

    /// Unit vector along a cardinal axis.
    pub const fn from_axis(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::new(1.0, 0.0, 0.0),
            Axis::Y => Self::new(0.0, 1.0, 0.0),
            Axis::Z => Self::new(0.0, 0.0, 1.0),
        }
    }

    /// Vector pointing from `origin` to `target`.
    pub fn from_coords(origin: Point, target: Point) -> Self {
        target - origin
    }

    /// Copy of the plane's normal.
    pub fn from_plane(plane: &Plane) -> Self {
        plane.normal
    }

    pub(crate) fn from_array(array: &Array1<f64>) -> Self {
        Self::new(array[0], array[1], array[2])
    }

    pub(crate) fn to_array(self) -> Array1<f64> {
        arr1(&[self.i, self.j, self.k])
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.i * other.i + self.j * other.j + self.k * other.k
    }

    pub fn cross(self, other: Vector) -> Vector {
        Vector::new(
            self.j * other.k - self.k * other.j,
            self.k * other.i - self.i * other.k,
            self.i * other.j - self.j * other.i,
        )
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector with the same direction. A zero vector yields NaN components.
    pub fn unit(self) -> Vector {
        self / self.norm()
    }

    pub fn invert(self) -> Vector {
        -self
    }

    pub fn round(self, digits: i32) -> Vector {
        Vector::new(
            round_to(self.i, digits),
            round_to(self.j, digits),
            round_to(self.k, digits),
        )
    }

    /// Angle in radians between the two vectors, treated as undirected lines.
    ///
    /// The dot product is taken in absolute value, so the result is always in
    /// `[0, PI/2]` and opposite vectors measure as parallel.
    pub fn angle(self, other: Vector) -> f64 {
        let ratio = self.dot(other).abs() / (self.norm() * other.norm());
        // rounding can push exactly parallel vectors just above 1
        ratio.clamp(0.0, 1.0).acos()
    }

    /// Rotate about a cardinal axis or an arbitrary pivot vector, angle in radians.
    pub fn rotate(self, by: impl Into<Direction>, angle: f64) -> Vector {
        match by.into() {
            Direction::Axis(axis) => self.rotate_by_axis(axis, angle),
            Direction::Vector(pivot) => self.rotate_by_vector(pivot, angle),
        }
    }

    /// Right-handed rotation about a cardinal axis.
    pub fn rotate_by_axis(self, axis: Axis, angle: f64) -> Vector {
        let (sin, cos) = angle.sin_cos();
        let rotation = match axis {
            Axis::X => arr2(&[[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]),
            Axis::Y => arr2(&[[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]),
            Axis::Z => arr2(&[[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]]),
        };
        self.transform(&rotation)
    }

    /// Rodrigues' rotation about `pivot`. The pivot is normalised first.
    pub fn rotate_by_vector(self, pivot: Vector, angle: f64) -> Vector {
        let (sin, cos) = angle.sin_cos();
        let Vector {
            i: ux,
            j: uy,
            k: uz,
        } = pivot.unit();
        let t = 1.0 - cos;

        let rotation = arr2(&[
            [cos + ux * ux * t, ux * uy * t - uz * sin, ux * uz * t + uy * sin],
            [uy * ux * t + uz * sin, cos + uy * uy * t, uy * uz * t - ux * sin],
            [uz * ux * t - uy * sin, uz * uy * t + ux * sin, cos + uz * uz * t],
        ]);
        self.transform(&rotation)
    }

    fn transform(self, matrix: &Array2<f64>) -> Vector {
        Vector::from_array(&matrix.dot(&self.to_array()))
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.i + rhs.i, self.j + rhs.j, self.k + rhs.k)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.i - rhs.i, self.j - rhs.j, self.k - rhs.k)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.i, -self.j, -self.k)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.i * rhs, self.j * rhs, self.k * rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(self, rhs: f64) -> Vector {
        Vector::new(self.i / rhs, self.j / rhs, self.k / rhs)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i:{:.2} j:{:.2} k:{:.2}", self.i, self.j, self.k)
    }
}

/// A position in world space, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, to: Point) -> f64 {
        (self - to).norm()
    }

    /// Move `distance` units along an axis or vector. The vector is not normalised.
    pub fn translate(self, by: impl Into<Direction>, distance: f64) -> Point {
        self + by.into().to_vector() * distance
    }

    pub fn intersects(self, plane: &Plane) -> bool {
        plane.intersects(self)
    }

    pub fn round(self, digits: i32) -> Point {
        Point::new(
            round_to(self.x, digits),
            round_to(self.y, digits),
            round_to(self.z, digits),
        )
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.i, self.y + rhs.j, self.z + rhs.k)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x:{:.2} y:{:.2} z:{:.2}", self.x, self.y, self.z)
    }
}

/// A point with some coordinates left open, to be solved by [`Plane::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartialPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl PartialPoint {
    pub const fn new(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self { x, y, z }
    }

    pub fn unknowns(&self) -> usize {
        [self.x, self.y, self.z]
            .iter()
            .filter(|c| c.is_none())
            .count()
    }

    /// The full point, or `None` while any coordinate is still open.
    pub fn resolved(self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?, self.z?))
    }
}

impl From<Point> for PartialPoint {
    fn from(point: Point) -> Self {
        Self::new(Some(point.x), Some(point.y), Some(point.z))
    }
}
