use std::collections::HashSet;

use ndarray::{Array3, s};
use tracing::{debug, warn};

use crate::enums::Locator;
use crate::error::{Error, HomogeneityError, Result};
use crate::params::VolumeParams;
use crate::slice::Slice;

/// Linear Z mapping of a homogeneous volume. `end_z` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZMapping {
    pub start_z: f64,
    pub end_z: f64,
    pub thickness: f64,
}

/// Stack of slices sorted by ascending Z.
///
/// Only a volume that passed the homogeneity test carries a [`ZMapping`];
/// every Z lookup fails without one.
#[derive(Debug, Clone)]
pub struct Volume {
    slices: Vec<Slice>,
    mapping: Option<ZMapping>,
}

fn z_key(z: f64) -> u64 {
    // folds -0.0 into 0.0
    (z + 0.0).to_bits()
}

impl Volume {
    /// Sort `slices` by their derived Z, index them and optionally verify
    /// homogeneity.
    ///
    /// # Errors
    ///
    /// Returns an error if `slices` is empty or verification is enabled and
    /// fails.
    pub fn new(slices: Vec<Slice>, params: &VolumeParams) -> Result<Self> {
        if slices.is_empty() {
            return Err(Error::Argument("no slices to build a volume from".to_owned()));
        }

        let mut slices = if params.fix_z_duplicates {
            Self::fix_z_duplicates(slices)
        } else {
            slices
        };
        slices.sort_by(|a, b| a.z_location().total_cmp(&b.z_location()));

        let slices = slices
            .into_iter()
            .enumerate()
            .map(|(index, slice)| slice.with_index(index))
            .collect();

        let mut volume = Self {
            slices,
            mapping: None,
        };

        if params.verify_homogeneity {
            volume.verify_homogeneity(params.tolerance)?;
            let mapping = volume.build_z_mapping();
            debug!(
                slices = volume.count(),
                start_z = mapping.start_z,
                end_z = mapping.end_z,
                thickness = mapping.thickness,
                "Volume verified as homogeneous"
            );
            volume.mapping = Some(mapping);
        }

        Ok(volume)
    }

    /// Single-slice volume, trivially homogeneous. Useful to take sections of
    /// planar images.
    pub fn from_slice(slice: Slice) -> Self {
        let mut volume = Self {
            slices: vec![slice.with_index(0)],
            mapping: None,
        };
        volume.mapping = Some(volume.build_z_mapping());
        volume
    }

    /// Drop slices repeating a Z location, keeping the first occurrence.
    ///
    /// Only repairs duplicates; gaps and other irregularities remain.
    pub fn fix_z_duplicates(slices: Vec<Slice>) -> Vec<Slice> {
        let mut locations: HashSet<u64> = slices.iter().map(|s| z_key(s.z_location())).collect();
        if locations.len() == slices.len() {
            return slices;
        }

        let total = slices.len();
        let curated: Vec<_> = slices
            .into_iter()
            .filter(|slice| locations.remove(&z_key(slice.z_location())))
            .collect();

        warn!(
            dropped = total - curated.len(),
            kept = curated.len(),
            "Dropped slices with duplicated Z location"
        );
        curated
    }

    /// Check that slices are Z-contiguous and share thickness, dimensions,
    /// orientation and pixel spacing.
    ///
    /// Consecutive gaps may deviate from the first gap by at most `tolerance`.
    pub fn verify_homogeneity(&self, tolerance: f64) -> std::result::Result<(), HomogeneityError> {
        let [first, second, ..] = self.slices.as_slice() else {
            return Ok(());
        };

        let reference = first.metadata();
        let ref_distance = second.z_location() - first.z_location();
        if ref_distance == 0.0 {
            return Err(HomogeneityError::ZeroGap(first.z_location()));
        }

        for (index, pair) in self.slices.windows(2).enumerate() {
            let (prev, slice) = (&pair[0], &pair[1]);
            let index = index + 1;
            let metadata = slice.metadata();

            let deviation = slice.z_location() - prev.z_location() - ref_distance;
            if deviation.abs() > tolerance {
                return Err(HomogeneityError::Discontinuous { index, deviation });
            }
            if metadata.thickness != reference.thickness {
                return Err(HomogeneityError::VariableThickness { index });
            }
            if metadata.rows != reference.rows || metadata.columns != reference.columns {
                return Err(HomogeneityError::VariableDimensions { index });
            }
            if metadata.orientation != reference.orientation {
                return Err(HomogeneityError::VariableOrientation { index });
            }
            if metadata.pixel_spacing != reference.pixel_spacing {
                return Err(HomogeneityError::VariableSpacing { index });
            }
        }

        Ok(())
    }

    /// Thickness is the first Z gap when there are two slices or more, which
    /// is more reliable than the declared slice thickness.
    pub fn build_z_mapping(&self) -> ZMapping {
        let first = self.first();
        let thickness = match self.slices.get(1) {
            Some(second) => second.z_location() - first.z_location(),
            None => first.thickness(),
        };
        let start_z = first.z_location();
        let end_z = self.last().z_location() + thickness;

        ZMapping {
            start_z,
            end_z,
            thickness,
        }
    }

    pub fn is_homogeneous(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn mapping(&self) -> Option<ZMapping> {
        self.mapping
    }

    pub(crate) fn ensure_homogeneity(&self) -> Result<ZMapping> {
        self.mapping
            .ok_or_else(|| HomogeneityError::NotVerified.into())
    }

    /// `(start_z, end_z)` of the volume, end exclusive.
    pub fn z_bounds(&self) -> Result<(f64, f64)> {
        let mapping = self.ensure_homogeneity()?;
        Ok((mapping.start_z, mapping.end_z))
    }

    /// Slice covering world `z`, found through the linear mapping.
    pub fn at_z(&self, z: f64) -> Result<Option<&Slice>> {
        let mapping = self.ensure_homogeneity()?;
        Ok(self.lookup_z(&mapping, z))
    }

    pub(crate) fn lookup_z(&self, mapping: &ZMapping, z: f64) -> Option<&Slice> {
        if !(z >= mapping.start_z && z < mapping.end_z) {
            return None;
        }
        let index = ((z - mapping.start_z) / mapping.thickness).floor() as usize;
        self.slices.get(index.min(self.slices.len() - 1))
    }

    pub fn at_index(&self, index: usize) -> Option<&Slice> {
        self.slices.get(index)
    }

    /// Look up by index, by Z, or by a full point which must also fall in
    /// the slice footprint.
    pub fn at(&self, locator: impl Into<Locator>) -> Result<Option<&Slice>> {
        match locator.into() {
            Locator::Index(index) => Ok(self.at_index(index)),
            Locator::Z(z) => self.at_z(z),
            Locator::Space(point) => Ok(self
                .at_z(point.z)?
                .filter(|slice| slice.intersects_xy(point.x, point.y))),
        }
    }

    /// Linear search by each slice's own thickness band. Works on volumes
    /// that were not verified.
    pub fn find_slice(&self, z: f64) -> Option<&Slice> {
        self.slices.iter().find(|slice| slice.intersects_z(z))
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn count(&self) -> usize {
        self.slices.len()
    }

    /// Lowest slice on the Z axis.
    pub fn first(&self) -> &Slice {
        &self.slices[0]
    }

    /// Highest slice on the Z axis.
    pub fn last(&self) -> &Slice {
        &self.slices[self.slices.len() - 1]
    }

    pub fn middle(&self) -> &Slice {
        &self.slices[self.slices.len() / 2]
    }

    pub fn prev(&self, slice: &Slice) -> Option<&Slice> {
        slice
            .index()
            .checked_sub(1)
            .and_then(|index| self.at_index(index))
    }

    pub fn next(&self, slice: &Slice) -> Option<&Slice> {
        self.at_index(slice.index() + 1)
    }

    /// Get the dimensions of the volume (depth, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        let first = self.first();
        (self.count(), first.rows(), first.columns())
    }

    /// Copy all pixel data into one `(depth, rows, columns)` array.
    pub fn to_array(&self) -> Result<Array3<u16>> {
        self.ensure_homogeneity()?;
        let mut volume = Array3::<u16>::zeros(self.dim());

        for (i, slice) in self.slices.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(slice.pixels());
        }

        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Axis;
    use crate::slice::SliceMetadata;
    use crate::vector::{Point, Vector};
    use ndarray::Array2;

    fn slice_at(z: f64, value: u16) -> Slice {
        Slice::new(
            Array2::from_elem((2, 3), value),
            SliceMetadata {
                rows: 2,
                columns: 3,
                thickness: 1.5,
                pixel_spacing: (0.5, 0.5),
                orientation: (Vector::from_axis(Axis::X), Vector::from_axis(Axis::Y)),
                position: Point::new(0.0, 0.0, z),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_sorts_and_indexes() {
        let slices = vec![slice_at(3.0, 3), slice_at(1.5, 2), slice_at(0.0, 1)];
        let volume = Volume::new(slices, &VolumeParams::default()).unwrap();

        let order: Vec<_> = volume.slices().iter().map(|s| s.pixels()[[0, 0]]).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(volume.slices().iter().enumerate().all(|(i, s)| s.index() == i));
        assert_eq!(volume.dim(), (3, 2, 3));
    }

    #[test]
    fn test_empty_volume_is_rejected() {
        let result = Volume::new(Vec::new(), &VolumeParams::default());
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_zero_first_gap() {
        let slices = vec![slice_at(0.0, 1), slice_at(0.0, 2)];
        let result = Volume::new(slices, &VolumeParams::default());
        assert!(matches!(
            result,
            Err(Error::Homogeneity(HomogeneityError::ZeroGap(_)))
        ));
    }

    #[test]
    fn test_variable_metadata() {
        let mut odd = slice_at(3.0, 3).metadata().clone();
        odd.pixel_spacing = (0.6, 0.6);
        let odd = Slice::new(Array2::zeros((2, 3)), odd).unwrap();

        let slices = vec![slice_at(0.0, 1), slice_at(1.5, 2), odd];
        let result = Volume::new(slices, &VolumeParams::default());
        assert!(matches!(
            result,
            Err(Error::Homogeneity(HomogeneityError::VariableSpacing { index: 2 }))
        ));
    }

    #[test]
    fn test_single_slice_mapping_uses_thickness() {
        let volume = Volume::from_slice(slice_at(4.0, 1));
        assert_eq!(
            volume.mapping(),
            Some(ZMapping {
                start_z: 4.0,
                end_z: 5.5,
                thickness: 1.5
            })
        );
        assert_eq!(volume.at_z(5.0).unwrap().map(Slice::index), Some(0));
    }

    #[test]
    fn test_unverified_volume() {
        let slices = vec![slice_at(0.0, 1), slice_at(1.5, 2), slice_at(7.0, 3)];
        let volume = Volume::new(slices, &VolumeParams::unverified()).unwrap();

        assert!(!volume.is_homogeneous());
        assert!(matches!(
            volume.at_z(0.5),
            Err(Error::Homogeneity(HomogeneityError::NotVerified))
        ));
        assert!(volume.to_array().is_err());
        assert_eq!(volume.find_slice(7.2).map(Slice::index), Some(2));
        assert!(volume.find_slice(5.0).is_none());
    }

    #[test]
    fn test_navigation() {
        let slices = vec![slice_at(0.0, 1), slice_at(1.5, 2), slice_at(3.0, 3)];
        let volume = Volume::new(slices, &VolumeParams::default()).unwrap();

        let middle = volume.middle();
        assert_eq!(middle.index(), 1);
        assert_eq!(volume.prev(middle).map(Slice::index), Some(0));
        assert_eq!(volume.next(middle).map(Slice::index), Some(2));
        assert!(volume.prev(volume.first()).is_none());
        assert!(volume.next(volume.last()).is_none());
    }

    #[test]
    fn test_at_point_checks_footprint() {
        let slices = vec![slice_at(0.0, 1), slice_at(1.5, 2)];
        let volume = Volume::new(slices, &VolumeParams::default()).unwrap();

        let inside = volume.at(Point::new(0.5, 0.25, 2.0)).unwrap();
        assert_eq!(inside.map(Slice::index), Some(1));
        assert!(volume.at(Point::new(5.0, 0.25, 2.0)).unwrap().is_none());
        assert_eq!(volume.at(0usize).unwrap().map(Slice::index), Some(0));
        assert!(volume.at(9usize).unwrap().is_none());
    }

    #[test]
    fn test_to_array() {
        let slices = vec![slice_at(1.5, 2), slice_at(0.0, 1)];
        let volume = Volume::new(slices, &VolumeParams::default()).unwrap();
        let array = volume.to_array().unwrap();
        assert_eq!(array.dim(), (2, 2, 3));
        assert_eq!(array[[0, 1, 2]], 1);
        assert_eq!(array[[1, 0, 0]], 2);
    }
}
