use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use image::GrayImage;
use ndarray::Array2;
use tracing::debug;

use crate::enums::{ImageSize, Orientation};
use crate::error::{Error, GeometryError, Result};
use crate::lcs::LocalCoordinateSystem;
use crate::params::SectionParams;
use crate::plane::Plane;
use crate::resampler;
use crate::slice::{Slice, pixel_index};
use crate::vector::{Point, Vector};
use crate::volume::Volume;

const MM_PER_INCH: f64 = 25.4;

/// An arbitrary, possibly oblique, cutting frame through a volume.
///
/// The frame origin is the center of every image produced from it.
#[derive(Debug, Clone)]
pub struct Section {
    volume: Arc<Volume>,
    transform: LocalCoordinateSystem,
}

impl Section {
    pub fn new(volume: Arc<Volume>, transform: LocalCoordinateSystem) -> Self {
        Self { volume, transform }
    }

    /// Section along `plane`, centered on `origin`.
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfBounds`] if no slice covers `origin.z`
    /// * [`Error::Geometry`] if the plane does not cross the anchor slice
    ///   at exactly two boundary points
    /// * [`Error::Homogeneity`] if the volume was not verified
    pub fn from_plane(
        volume: Arc<Volume>,
        plane: &Plane,
        origin: Point,
        params: &SectionParams,
    ) -> Result<Self> {
        let transform = derive_frame(&volume, plane, origin, params)?;
        Ok(Self::new(volume, transform))
    }

    /// Section along one of the standard medical planes through `origin`.
    pub fn from_orientation(
        volume: Arc<Volume>,
        orientation: Orientation,
        origin: Point,
        params: &SectionParams,
    ) -> Result<Self> {
        let plane = Plane::from_axes(orientation.axes()).move_to(origin);
        Self::from_plane(volume, &plane, origin, params)
    }

    /// Section of a single planar slice, centered on the slice center.
    pub fn from_slice(slice: Slice) -> Self {
        let volume = Volume::from_slice(slice);
        let anchor = volume.first();
        let transform = anchor.transform().with_origin(anchor.center());
        Self::new(Arc::new(volume), transform)
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn transform(&self) -> &LocalCoordinateSystem {
        &self.transform
    }

    /// Millimeters between output pixels along X and Y.
    pub fn pixel_spacing(&self) -> (f64, f64) {
        self.transform.scaling()
    }

    pub fn with_pixel_spacing(&self, spacing: (f64, f64)) -> Self {
        Self::new(self.volume.clone(), self.transform.with_scaling(spacing))
    }

    /// Output pixels per millimeter.
    pub fn pixel_density(&self) -> (f64, f64) {
        let (sx, sy) = self.pixel_spacing();
        (1.0 / sx, 1.0 / sy)
    }

    pub fn with_pixel_density(&self, (dx, dy): (f64, f64)) -> Self {
        self.with_pixel_spacing((1.0 / dx, 1.0 / dy))
    }

    /// Output pixels per inch.
    pub fn dpi(&self) -> (f64, f64) {
        let (sx, sy) = self.pixel_spacing();
        (MM_PER_INCH / sx, MM_PER_INCH / sy)
    }

    pub fn with_dpi(&self, (dx, dy): (f64, f64)) -> Self {
        self.with_pixel_spacing((MM_PER_INCH / dx, MM_PER_INCH / dy))
    }

    pub fn to_mm(&self, x: f64, y: f64) -> Point {
        self.transform.to_world(x, y)
    }

    pub fn to_pixel(&self, point: Point) -> (i64, i64) {
        let (x, y) = self.transform.to_local(point);
        (pixel_index(x), pixel_index(y))
    }

    /// Resample the volume into a raster of shape `(height, width)`.
    pub fn image(&self, size: impl Into<ImageSize>) -> Result<Array2<u16>> {
        resampler::resample(self, size.into())
    }

    /// Like [`Section::image`], stretched to 8 bits for export.
    pub fn to_luma8(&self, size: impl Into<ImageSize>) -> Result<GrayImage> {
        resampler::to_luma8(&self.image(size)?)
    }
}

fn derive_frame(
    volume: &Volume,
    plane: &Plane,
    origin: Point,
    params: &SectionParams,
) -> Result<LocalCoordinateSystem> {
    let anchor = volume
        .at_z(origin.z)?
        .ok_or(Error::OutOfBounds { z: origin.z })?;

    let (x_vector, y_vector) = if plane.parallel(&anchor.plane(), params.parallel_tolerance) {
        (anchor.transform().x_vector(), anchor.transform().y_vector())
    } else {
        let (first, second) = anchor.plane_intersection(plane)?;
        let direction = [first, second]
            .into_iter()
            .map(|point| Vector::from_coords(origin, point))
            .find(|direction| direction.norm() > f64::EPSILON)
            .ok_or(GeometryError::DegenerateVector)?;

        // Y is X turned a quarter around the plane normal
        let x_vector = direction.unit();
        let y_vector = x_vector.rotate_by_vector(plane.normal, FRAC_PI_2);

        if params.canonical_orientation {
            canonicalize(x_vector, y_vector)
        } else {
            (x_vector, y_vector)
        }
    };

    debug!(
        anchor = anchor.index(),
        x_vector = %x_vector,
        y_vector = %y_vector,
        "Derived section frame"
    );

    Ok(LocalCoordinateSystem::new(
        origin,
        x_vector,
        y_vector,
        anchor.pixel_spacing(),
    ))
}

/// Deterministic orientation regardless of which intersection point or
/// anchor slice was used. Unverified for planes close to the references.
fn canonicalize(mut x_vector: Vector, mut y_vector: Vector) -> (Vector, Vector) {
    const X_REFERENCE: Vector = Vector::new(1.0, 1.0, 0.0);
    const Y_REFERENCE: Vector = Vector::new(0.0, 0.0, 1.0);

    if x_vector.dot(X_REFERENCE) < 0.0 {
        x_vector = x_vector.invert();
    }
    if y_vector.dot(Y_REFERENCE) < 0.0 {
        y_vector = y_vector.invert();
    }
    if y_vector.k > 0.0 {
        y_vector = y_vector.invert();
    }

    (x_vector, y_vector)
}
