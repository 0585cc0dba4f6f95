use std::sync::Arc;

use ndarray::Array2;

use crate::enums::Axis;
use crate::params::VolumeParams;
use crate::slice::{Slice, SliceMetadata};
use crate::vector::{Point, Vector};
use crate::volume::Volume;

pub(crate) const ROWS: usize = 4;
pub(crate) const COLUMNS: usize = 6;

/// Axial 4x6 slice with 1 mm pixels and 2 mm thickness, top-left at
/// `(-3, -2, z)`. Pixel values encode `layer * 100 + row * 10 + column + 1`.
pub(crate) fn axial_slice(layer: u16, z: f64) -> Slice {
    let pixels = Array2::from_shape_fn((ROWS, COLUMNS), |(r, c)| {
        layer * 100 + (r * 10 + c) as u16 + 1
    });
    Slice::new(
        pixels,
        SliceMetadata {
            rows: ROWS,
            columns: COLUMNS,
            thickness: 2.0,
            pixel_spacing: (1.0, 1.0),
            orientation: (Vector::from_axis(Axis::X), Vector::from_axis(Axis::Y)),
            position: Point::new(-3.0, -2.0, z),
        },
    )
    .unwrap()
}

/// Five slices at Z = 10, 12, ..., 18.
pub(crate) fn stack() -> Arc<Volume> {
    let slices = (0..5).map(|i| axial_slice(i, 10.0 + 2.0 * f64::from(i))).collect();
    Arc::new(Volume::new(slices, &VolumeParams::default()).unwrap())
}
