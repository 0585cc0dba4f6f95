//! Affine mapping between a 2D pixel frame and 3D world space.

use ndarray::{Array2, arr1, arr2};

use crate::enums::{Coordinates, Direction, Scale};
use crate::error::{Error, Result};
use crate::vector::{Point, Vector};

/// Local coordinate system of a slice or a section.
///
/// Local `(x, y)` maps to `origin + x·sx·x_vector + y·sy·y_vector`. The axes
/// are expected to be unit length and orthogonal; nothing enforces it, but
/// [`LocalCoordinateSystem::to_local`] is only the inverse of
/// [`LocalCoordinateSystem::to_world`] when they are.
///
/// Instances are immutable. Every operation returns a new system with its
/// transformation matrix rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCoordinateSystem {
    origin: Point,
    x_vector: Vector,
    y_vector: Vector,
    scaling: (f64, f64),
    matrix: Array2<f64>,
}

impl LocalCoordinateSystem {
    pub fn new(origin: Point, x_vector: Vector, y_vector: Vector, scaling: (f64, f64)) -> Self {
        let (sx, sy) = scaling;
        let matrix = arr2(&[
            [x_vector.i * sx, y_vector.i * sy, 0.0, origin.x],
            [x_vector.j * sx, y_vector.j * sy, 0.0, origin.y],
            [x_vector.k * sx, y_vector.k * sy, 0.0, origin.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self {
            origin,
            x_vector,
            y_vector,
            scaling,
            matrix,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn x_vector(&self) -> Vector {
        self.x_vector
    }

    pub fn y_vector(&self) -> Vector {
        self.y_vector
    }

    /// World units per local unit along each axis.
    pub fn scaling(&self) -> (f64, f64) {
        self.scaling
    }

    /// The 4×4 homogeneous matrix applied by [`LocalCoordinateSystem::to_world`].
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn with_origin(&self, origin: Point) -> Self {
        Self::new(origin, self.x_vector, self.y_vector, self.scaling)
    }

    pub fn with_scaling(&self, scaling: (f64, f64)) -> Self {
        Self::new(self.origin, self.x_vector, self.y_vector, scaling)
    }

    pub fn to_world(&self, x: f64, y: f64) -> Point {
        let world = self.matrix.dot(&arr1(&[x, y, 0.0, 1.0]));
        Point::new(world[0], world[1], world[2])
    }

    pub fn to_local(&self, point: Point) -> (f64, f64) {
        let offset = point - self.origin;
        let (sx, sy) = self.scaling;
        (offset.dot(self.x_vector) / sx, offset.dot(self.y_vector) / sy)
    }

    /// Distance between two positions, measured in the *other* space.
    ///
    /// Two local positions give their world distance; two world positions
    /// give their distance in local units.
    pub fn measure(&self, from: impl Into<Coordinates>, to: impl Into<Coordinates>) -> Result<f64> {
        match (from.into(), to.into()) {
            (Coordinates::Planar(xs, ys), Coordinates::Planar(xe, ye)) => {
                Ok(self.to_world(xs, ys).distance(self.to_world(xe, ye)))
            }
            (Coordinates::Space(start), Coordinates::Space(end)) => {
                let (xs, ys) = self.to_local(start);
                let (xe, ye) = self.to_local(end);
                Ok((xe - xs).hypot(ye - ys))
            }
            (from, to) => Err(Error::Argument(format!(
                "inconsistent dimensions for measuring distance ({from:?}, {to:?})"
            ))),
        }
    }

    /// Rotate both axes identically. Origin and scaling are kept.
    pub fn rotate(&self, by: impl Into<Direction>, angle: f64) -> Self {
        let by = by.into();
        Self::new(
            self.origin,
            self.x_vector.rotate(by, angle),
            self.y_vector.rotate(by, angle),
            self.scaling,
        )
    }

    pub fn translate(&self, by: impl Into<Direction>, distance: f64) -> Self {
        self.with_origin(self.origin.translate(by, distance))
    }

    pub fn scale(&self, by: impl Into<Scale>) -> Self {
        let (fx, fy) = by.into().factors();
        let (sx, sy) = self.scaling;
        self.with_scaling((sx * fx, sy * fy))
    }
}
