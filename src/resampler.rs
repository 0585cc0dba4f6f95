//! Raster synthesis along a section frame.
//!
//! Each output row is mapped to a world-space segment and walked with a
//! constant per-pixel step. The frame mapping is affine, so stepping along the
//! segment lands on the same points as projecting every pixel through the
//! matrix; it only saves the per-pixel matrix product.

use image::{GrayImage, ImageBuffer};
use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::enums::ImageSize;
use crate::error::{Error, Result};
use crate::lcs::LocalCoordinateSystem;
use crate::section::Section;
use crate::vector::Point;
use crate::volume::{Volume, ZMapping};

// absorbs rounding when converting millimeters to a pixel count
const EXTENT_EPSILON: f64 = 1e-6;

/// Sample `section` into a `(height, width)` raster. Pixels not covered by
/// any slice stay 0.
pub(crate) fn resample(section: &Section, size: ImageSize) -> Result<Array2<u16>> {
    let volume = section.volume();
    let frame = section.transform();
    let mapping = volume.ensure_homogeneity()?;
    let (width, height) = pixel_extent(frame, size)?;

    debug!(width, height, "Resampling section");

    if width == 0 || height == 0 {
        return Ok(Array2::zeros((height, width)));
    }

    // frame origin lands at the image center
    let offset = (-((width / 2) as f64), -((height / 2) as f64));

    let pixel_data: Vec<u16> = (0..height)
        .into_par_iter()
        .flat_map(|row| render_row(volume, &mapping, frame, row, offset, width))
        .collect();

    Ok(Array2::from_shape_vec((height, width), pixel_data)?)
}

/// Output size in pixels. Physical sizes are converted by moving the frame
/// origin along each axis and measuring the move in local units.
fn pixel_extent(frame: &LocalCoordinateSystem, size: ImageSize) -> Result<(usize, usize)> {
    match size {
        ImageSize::Pixels { width, height } => Ok((width, height)),
        ImageSize::Millimeters { width, height } => {
            if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
                return Err(Error::Argument(format!(
                    "image size must be finite and positive, got {width}x{height} mm"
                )));
            }

            let origin = frame.origin();
            let far_right = origin.translate(frame.x_vector(), width);
            let far_up = origin.translate(frame.y_vector(), height);

            let (rx, ry) = frame.to_local(far_right);
            let (ux, uy) = frame.to_local(far_up);

            Ok((
                (rx.hypot(ry) + EXTENT_EPSILON) as usize,
                (ux.hypot(uy) + EXTENT_EPSILON) as usize,
            ))
        }
    }
}

fn render_row(
    volume: &Volume,
    mapping: &ZMapping,
    frame: &LocalCoordinateSystem,
    row: usize,
    (offset_x, offset_y): (f64, f64),
    width: usize,
) -> Vec<u16> {
    let mut line = vec![0u16; width];

    let y = row as f64 + offset_y;
    let start = frame.to_world(offset_x, y);
    let end = frame.to_world(offset_x + width as f64, y);
    let step = (end - start) / width as f64;

    let mut active = volume.lookup_z(mapping, start.z);
    let mut point: Point = start;

    for (column, value) in line.iter_mut().enumerate() {
        let slice = match active {
            Some(slice) if slice.intersects_z(point.z) => slice,
            _ => match volume.lookup_z(mapping, point.z) {
                Some(slice) => {
                    active = Some(slice);
                    slice
                }
                None => {
                    trace!(row, column, z = point.z, "Row left the volume");
                    break;
                }
            },
        };

        if let Some(pixel) = slice.value_at(point) {
            *value = pixel;
        }

        point = point + step;
    }

    line
}

#[inline]
fn normalize_to_u8(value: u16, max: u16) -> u8 {
    ((value as f32 / max as f32) * 255.0).clamp(0.0, 255.0) as u8
}

/// Stretch a raster to 8 bits, mapping its brightest pixel to 255.
pub(crate) fn to_luma8(raster: &Array2<u16>) -> Result<GrayImage> {
    let (height, width) = raster.dim();
    let max = raster.iter().copied().max().unwrap_or(0).max(1);

    let pixel_data: Vec<u8> = raster
        .iter()
        .map(|&v| normalize_to_u8(v, max))
        .collect();

    let width = u32::try_from(width)
        .map_err(|_| Error::Argument(format!("image width {width} too large")))?;
    let height = u32::try_from(height)
        .map_err(|_| Error::Argument(format!("image height {height} too large")))?;

    ImageBuffer::from_raw(width, height, pixel_data)
        .ok_or_else(|| Error::Argument("pixel buffer does not match image size".to_owned()))
}
