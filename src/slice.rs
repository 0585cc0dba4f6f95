use ndarray::Array2;

use crate::enums::Target;
use crate::error::{Error, GeometryError, Result};
use crate::lcs::LocalCoordinateSystem;
use crate::plane::Plane;
use crate::vector::{PartialPoint, Point, Vector};

// local coordinates this close below a pixel edge belong to the next pixel
const PIXEL_SNAP: f64 = 1e-6;

/// Pixel index holding the local coordinate `value`.
pub(crate) fn pixel_index(value: f64) -> i64 {
    (value + PIXEL_SNAP).floor() as i64
}

/// Per-slice metadata supplied by the image decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceMetadata {
    pub rows: usize,
    pub columns: usize,
    /// Depth covered by the slice along its own normal, in world units.
    pub thickness: f64,
    /// World units per column step and per row step, in that order.
    pub pixel_spacing: (f64, f64),
    /// Row direction (along increasing column) and column direction (along increasing row).
    pub orientation: (Vector, Vector),
    /// World position of pixel (0, 0).
    pub position: Point,
}

/// One layer of a volume: a pixel grid placed in world space.
#[derive(Debug, Clone)]
pub struct Slice {
    pixels: Array2<u16>,
    metadata: SliceMetadata,
    transform: LocalCoordinateSystem,
    z_location: f64,
    index: usize,
}

impl Slice {
    /// Build a slice from its pixel grid, shaped `(rows, columns)`.
    pub fn new(pixels: Array2<u16>, metadata: SliceMetadata) -> Result<Self> {
        if pixels.dim() != (metadata.rows, metadata.columns) {
            return Err(Error::Argument(format!(
                "pixel grid is {:?}, metadata declares {}x{}",
                pixels.dim(),
                metadata.rows,
                metadata.columns
            )));
        }

        let (sx, sy) = metadata.pixel_spacing;
        if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
            return Err(Error::Argument(format!(
                "pixel spacing must be finite and positive, got {sx}x{sy}"
            )));
        }

        let (x_vector, y_vector) = metadata.orientation;
        let transform = LocalCoordinateSystem::new(
            metadata.position,
            x_vector,
            y_vector,
            metadata.pixel_spacing,
        );
        // Decoders also report a slice location, but it is relative to an
        // unspecified reference point and can't be used for ordering.
        let z_location = transform.to_world(0.0, 0.0).z;

        Ok(Self {
            pixels,
            metadata,
            transform,
            z_location,
            index: 0,
        })
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn pixels(&self) -> &Array2<u16> {
        &self.pixels
    }

    pub fn metadata(&self) -> &SliceMetadata {
        &self.metadata
    }

    pub fn transform(&self) -> &LocalCoordinateSystem {
        &self.transform
    }

    /// World Z of pixel (0, 0).
    pub fn z_location(&self) -> f64 {
        self.z_location
    }

    /// Position in the owning volume's Z order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rows(&self) -> usize {
        self.metadata.rows
    }

    pub fn columns(&self) -> usize {
        self.metadata.columns
    }

    pub fn thickness(&self) -> f64 {
        self.metadata.thickness
    }

    pub fn pixel_spacing(&self) -> (f64, f64) {
        self.metadata.pixel_spacing
    }

    pub fn normal(&self) -> Vector {
        self.transform
            .x_vector()
            .cross(self.transform.y_vector())
            .unit()
    }

    pub fn to_mm(&self, x: f64, y: f64) -> Point {
        self.transform.to_world(x, y)
    }

    /// Pixel containing `point`, as `(column, row)`. May lie outside the grid.
    pub fn to_pixel(&self, point: Point) -> (i64, i64) {
        let (x, y) = self.transform.to_local(point);
        (pixel_index(x), pixel_index(y))
    }

    /// Native pixel value under `point`, or `None` outside the grid.
    pub fn value_at(&self, point: Point) -> Option<u16> {
        let (x, y) = self.to_pixel(point);
        if x < 0 || y < 0 {
            return None;
        }
        self.pixels.get([y as usize, x as usize]).copied()
    }

    pub fn center(&self) -> Point {
        self.to_mm(self.columns() as f64 / 2.0, self.rows() as f64 / 2.0)
    }

    /// Plane through the slice center, normal to the slice.
    pub fn plane(&self) -> Plane {
        let center = self.center();
        Plane::from_coords(center, center.translate(self.normal(), 1.0))
    }

    pub fn topleft(&self) -> Point {
        self.to_mm(0.0, 0.0)
    }

    pub fn topright(&self) -> Point {
        self.to_mm(self.last_column(), 0.0)
    }

    pub fn bottomleft(&self) -> Point {
        self.to_mm(0.0, self.last_row())
    }

    pub fn bottomright(&self) -> Point {
        self.to_mm(self.last_column(), self.last_row())
    }

    fn last_column(&self) -> f64 {
        self.columns().saturating_sub(1) as f64
    }

    fn last_row(&self) -> f64 {
        self.rows().saturating_sub(1) as f64
    }

    /// `z` falls in `[Z, Z + thickness)`.
    pub fn intersects_z(&self, z: f64) -> bool {
        z >= self.z_location && z < self.z_location + self.thickness()
    }

    /// World `(x, y)` lies within the slice footprint, edges included.
    pub fn intersects_xy(&self, x: f64, y: f64) -> bool {
        let ((xs, xe), (ys, ye)) = self.extent();
        x >= xs && x <= xe && y >= ys && y <= ye
    }

    pub fn intersects_point(&self, point: Point) -> bool {
        self.intersects_z(point.z) && self.intersects_xy(point.x, point.y)
    }

    pub fn intersects(&self, target: impl Into<Target>) -> bool {
        match target.into() {
            Target::Z(z) => self.intersects_z(z),
            Target::Planar(x, y) => self.intersects_xy(x, y),
            Target::Space(point) => self.intersects_point(point),
            Target::Plane(plane) => self.plane_intersection(&plane).is_ok(),
        }
    }

    /// The two points where `plane` crosses the slice's rectangular boundary.
    ///
    /// The plane is probed along the two fixed-x and the two fixed-y edges at
    /// the slice Z. Unresolvable or out-of-bounds candidates are dropped and
    /// duplicates merged; anything other than exactly two survivors is an
    /// error.
    pub fn plane_intersection(
        &self,
        plane: &Plane,
    ) -> std::result::Result<(Point, Point), GeometryError> {
        let z = self.z_location;
        let topleft = self.topleft();
        let bottomright = self.bottomright();
        let ((xs, xe), (ys, ye)) = self.extent();

        let candidates = [
            PartialPoint::new(Some(topleft.x), None, Some(z)),
            PartialPoint::new(None, Some(topleft.y), Some(z)),
            PartialPoint::new(Some(bottomright.x), None, Some(z)),
            PartialPoint::new(None, Some(bottomright.y), Some(z)),
        ];

        let mut found: Vec<(f64, f64)> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(point) = plane.resolve(candidate).resolved() else {
                continue;
            };
            let (x, y) = (point.x, point.y);
            if x < xs || x > xe || y < ys || y > ye {
                continue;
            }
            if !found.contains(&(x, y)) {
                found.push((x, y));
            }
        }

        match found[..] {
            [(x1, y1), (x2, y2)] => Ok((Point::new(x1, y1, z), Point::new(x2, y2, z))),
            _ => Err(GeometryError::AmbiguousIntersection(found.len())),
        }
    }

    fn extent(&self) -> ((f64, f64), (f64, f64)) {
        let topleft = self.topleft();
        let bottomright = self.bottomright();
        (
            (topleft.x.min(bottomright.x), topleft.x.max(bottomright.x)),
            (topleft.y.min(bottomright.y), topleft.y.max(bottomright.y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Axis, PlanarAxes};
    use approx::assert_relative_eq;

    fn axial(z: f64) -> Slice {
        let pixels = Array2::from_shape_fn((4, 6), |(r, c)| (r * 10 + c) as u16);
        Slice::new(
            pixels,
            SliceMetadata {
                rows: 4,
                columns: 6,
                thickness: 2.0,
                pixel_spacing: (1.0, 1.0),
                orientation: (Vector::from_axis(Axis::X), Vector::from_axis(Axis::Y)),
                position: Point::new(-3.0, -2.0, z),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_mismatched_grid() {
        let mut metadata = axial(0.0).metadata().clone();
        metadata.rows = 5;
        let result = Slice::new(Array2::zeros((4, 6)), metadata);
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_rejects_invalid_spacing() {
        for spacing in [(0.0, 1.0), (1.0, -0.5), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            let mut metadata = axial(0.0).metadata().clone();
            metadata.pixel_spacing = spacing;
            let result = Slice::new(Array2::zeros((4, 6)), metadata);
            assert!(matches!(result, Err(Error::Argument(_))), "{spacing:?}");
        }
    }

    #[test]
    fn test_z_location_comes_from_position() {
        let slice = axial(14.0);
        assert_eq!(slice.z_location(), 14.0);
        assert_eq!(slice.normal(), Vector::from_axis(Axis::Z));
    }

    #[test]
    fn test_corners_and_center() {
        let slice = axial(14.0);
        assert_eq!(slice.topleft(), Point::new(-3.0, -2.0, 14.0));
        assert_eq!(slice.topright(), Point::new(2.0, -2.0, 14.0));
        assert_eq!(slice.bottomleft(), Point::new(-3.0, 1.0, 14.0));
        assert_eq!(slice.bottomright(), Point::new(2.0, 1.0, 14.0));
        assert_eq!(slice.center(), Point::new(0.0, 0.0, 14.0));
        assert_relative_eq!(slice.topleft().distance(slice.topright()), 5.0);
    }

    #[test]
    fn test_plane_is_normal_through_center() {
        let plane = axial(14.0).plane();
        assert_eq!(plane, Plane::from_axes(PlanarAxes::XY).move_to(Point::new(0.0, 0.0, 14.0)));
    }

    #[test]
    fn test_pixel_lookup() {
        let slice = axial(14.0);
        assert_eq!(slice.to_pixel(Point::new(-3.0, -2.0, 14.0)), (0, 0));
        assert_eq!(slice.to_pixel(Point::new(-0.5, 0.5, 14.0)), (2, 2));
        assert_eq!(slice.to_pixel(Point::new(-3.5, -2.0, 14.0)), (-1, 0));

        assert_eq!(slice.value_at(Point::new(-1.0, 0.0, 14.0)), Some(22));
        assert_eq!(slice.value_at(Point::new(-3.5, 0.0, 14.0)), None);
        assert_eq!(slice.value_at(Point::new(3.0, 0.0, 14.0)), None);
        assert_eq!(slice.value_at(Point::new(0.0, 2.0, 14.0)), None);
    }

    #[test]
    fn test_pixel_lookup_snaps_to_edges() {
        let slice = axial(14.0);
        let below_corner = Point::new(-3.0 - 1e-12, -2.0 - 1e-12, 14.0);
        assert_eq!(slice.to_pixel(below_corner), (0, 0));
        assert_eq!(slice.value_at(below_corner), Some(0));

        let below_edge = Point::new(-1.0 - 1e-12, 0.0, 14.0);
        assert_eq!(slice.value_at(below_edge), Some(22));
        assert_eq!(slice.to_pixel(Point::new(-3.001, -2.0, 14.0)), (-1, 0));
    }

    #[test]
    fn test_intersections() {
        let slice = axial(14.0);
        assert!(slice.intersects(14.0));
        assert!(slice.intersects(15.9));
        assert!(!slice.intersects(16.0));
        assert!(slice.intersects((2.0, 1.0)));
        assert!(!slice.intersects((2.1, 1.0)));
        assert!(slice.intersects(Point::new(0.0, 0.0, 15.0)));
        assert!(!slice.intersects(Point::new(0.0, 0.0, 13.0)));
    }

    #[test]
    fn test_plane_intersection() {
        let slice = axial(14.0);
        let coronal = Plane::from_axes(PlanarAxes::XZ);
        let (first, second) = slice.plane_intersection(&coronal).unwrap();
        assert_eq!(first, Point::new(-3.0, 0.0, 14.0));
        assert_eq!(second, Point::new(2.0, 0.0, 14.0));
        assert!(slice.intersects(coronal));
    }

    #[test]
    fn test_plane_intersection_requires_two_points() {
        let slice = axial(14.0);

        let parallel = Plane::from_axes(PlanarAxes::XY);
        assert_eq!(
            slice.plane_intersection(&parallel),
            Err(GeometryError::AmbiguousIntersection(0))
        );

        // touches only the top-left corner
        let corner = Plane::new(1.0, 1.0, 0.0, -5.0);
        assert_eq!(
            slice.plane_intersection(&corner),
            Err(GeometryError::AmbiguousIntersection(1))
        );

        let outside = Plane::from_axes(PlanarAxes::YZ).move_to(Point::new(50.0, 0.0, 0.0));
        assert!(!slice.intersects(outside));
    }
}
