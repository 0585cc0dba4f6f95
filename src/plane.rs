use std::fmt;

use crate::enums::{Direction, PlanarAxes};
use crate::vector::{PartialPoint, Point, Vector, round_to};

/// Plane described by the equation `a·x + b·y + c·z = d`.
///
/// The normal `(a, b, c)` is unit-length when built with [`Plane::from_coords`]
/// or [`Plane::from_axes`], but no operation renormalises it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vector,
    pub d: f64,
}

impl Plane {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            normal: Vector::new(a, b, c),
            d,
        }
    }

    pub const fn from_normal(normal: Vector, d: f64) -> Self {
        Self { normal, d }
    }

    /// Plane through `origin` whose normal points from `origin` to `target`.
    /// The normal is trimmed to unit length.
    pub fn from_coords(origin: Point, target: Point) -> Self {
        let n = Vector::from_coords(origin, target).unit();
        Self::from_normal(n, n.i * origin.x + n.j * origin.y + n.k * origin.z)
    }

    /// Standard plane through the world origin.
    pub fn from_axes(axes: PlanarAxes) -> Self {
        Self::from_normal(Vector::from_axis(axes.normal()), 0.0)
    }

    pub fn a(&self) -> f64 {
        self.normal.i
    }

    pub fn b(&self) -> f64 {
        self.normal.j
    }

    pub fn c(&self) -> f64 {
        self.normal.k
    }

    pub fn round(&self, digits: i32) -> Plane {
        Plane::from_normal(self.normal.round(digits), round_to(self.d, digits))
    }

    /// Rotate the normal only. `d` is kept, so the plane pivots about the
    /// world origin rather than about any point on itself.
    pub fn rotate(&self, by: impl Into<Direction>, angle: f64) -> Plane {
        Plane::from_normal(self.normal.rotate(by, angle), self.d)
    }

    /// Same normal, `d` recomputed so the plane passes through `point`.
    pub fn move_to(&self, point: Point) -> Plane {
        let Vector { i: a, j: b, k: c } = self.normal;
        Plane::new(a, b, c, a * point.x + b * point.y + c * point.z)
    }

    /// Angle between the normals, in `[0, PI/2]`.
    pub fn angle(&self, other: &Plane) -> f64 {
        self.normal.angle(other.normal)
    }

    pub fn parallel(&self, other: &Plane, tolerance: f64) -> bool {
        self.angle(other) < tolerance
    }

    /// Solve the single open coordinate of `point` from the plane equation.
    ///
    /// The point comes back unchanged when it does not have exactly one open
    /// coordinate or when the matching normal coefficient is zero; check
    /// [`PartialPoint::resolved`] to know whether solving happened.
    pub fn resolve(&self, point: PartialPoint) -> PartialPoint {
        if point.unknowns() != 1 {
            return point;
        }
        let (a, b, c) = (self.a(), self.b(), self.c());

        match point {
            PartialPoint {
                x: None,
                y: Some(y),
                z: Some(z),
            } if a != 0.0 => PartialPoint::new(Some((self.d - c * z - b * y) / a), Some(y), Some(z)),
            PartialPoint {
                x: Some(x),
                y: None,
                z: Some(z),
            } if b != 0.0 => PartialPoint::new(Some(x), Some((self.d - c * z - a * x) / b), Some(z)),
            PartialPoint {
                x: Some(x),
                y: Some(y),
                z: None,
            } if c != 0.0 => PartialPoint::new(Some(x), Some(y), Some((self.d - b * y - a * x) / c)),
            _ => point,
        }
    }

    /// Exact floating-point test of the plane equation.
    ///
    /// Only reliable for inputs that are exactly representable; prefer
    /// [`Plane::intersects_within`] for computed points.
    pub fn intersects(&self, point: Point) -> bool {
        self.evaluate(point) == self.d
    }

    pub fn intersects_within(&self, point: Point, tolerance: f64) -> bool {
        (self.evaluate(point) - self.d).abs() <= tolerance
    }

    fn evaluate(&self, point: Point) -> f64 {
        self.a() * point.x + self.b() * point.y + self.c() * point.z
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}X + {:.2}Y + {:.2}Z = {:.2}",
            self.a(),
            self.b(),
            self.c(),
            self.d
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Axis;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_axes() {
        assert_eq!(Plane::from_axes(PlanarAxes::XY), Plane::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(
            Plane::from_axes(PlanarAxes::XZ),
            Plane::from_coords(Point::new(0.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0))
        );
        let angle = Plane::from_axes(PlanarAxes::XZ).angle(&Plane::from_axes(PlanarAxes::XY));
        assert_relative_eq!(angle.to_degrees(), 90.0);
    }

    #[test]
    fn test_from_coords_is_unit() {
        let plane = Plane::from_coords(Point::new(1.0, 1.0, 1.0), Point::new(4.0, 5.0, 1.0));
        assert_relative_eq!(plane.normal.norm(), 1.0);
        assert_relative_eq!(plane.a(), 0.6);
        assert_relative_eq!(plane.b(), 0.8);
        assert_relative_eq!(plane.d, 1.4);
    }

    #[test]
    fn test_rotate_xy_into_yz() {
        let rotated = Plane::from_axes(PlanarAxes::XY)
            .rotate(Axis::Y, 90f64.to_radians())
            .round(10);
        assert_eq!(rotated, Plane::from_axes(PlanarAxes::YZ));
    }

    #[test]
    fn test_rotate_keeps_d() {
        let plane = Plane::new(0.0, 0.0, 1.0, 7.0).rotate(Axis::X, 0.4);
        assert_eq!(plane.d, 7.0);
    }

    #[test]
    fn test_move_to_intersects() {
        let point = Point::new(3.0, -2.0, 10.0);
        let plane = Plane::from_axes(PlanarAxes::XY)
            .rotate(Axis::Y, 30f64.to_radians())
            .move_to(point);
        assert!(plane.intersects(point));
        assert!(point.intersects(&plane));
        assert!(!plane.intersects(point.translate(plane.normal, 1.0)));
    }

    #[test]
    fn test_parallel() {
        let xy = Plane::from_axes(PlanarAxes::XY);
        let raised = xy.move_to(Point::new(0.0, 0.0, 10.0));
        assert_relative_eq!(raised.d, 10.0);
        assert!(xy.parallel(&raised, 1e-4));
        assert!(!xy.parallel(&xy.rotate(Axis::X, 0.01), 1e-4));
    }

    #[test]
    fn test_resolve() {
        let plane = Plane::from_axes(PlanarAxes::XY).rotate(Axis::Y, 30f64.to_radians());
        let resolved = plane
            .resolve(PartialPoint::new(Some(10.0), Some(10.0), None))
            .resolved()
            .unwrap();
        assert_relative_eq!(resolved.z, -5.7735, epsilon = 1e-4);
        assert!(plane.intersects_within(resolved, 1e-9));
    }

    #[test]
    fn test_resolve_zero_coefficient_is_unresolved() {
        let plane = Plane::from_axes(PlanarAxes::XY);
        let open = PartialPoint::new(None, Some(1.0), Some(0.0));
        assert_eq!(plane.resolve(open), open);
        assert_eq!(plane.resolve(open).resolved(), None);

        let too_open = PartialPoint::new(Some(1.0), None, None);
        assert_eq!(plane.resolve(too_open), too_open);
    }

    #[test]
    fn test_display() {
        let plane = Plane::from_axes(PlanarAxes::XY).move_to(Point::new(0.0, 0.0, 10.0));
        assert_eq!(plane.to_string(), "0.00X + 0.00Y + 1.00Z = 10.00");
    }
}
