//! Tunable parameters for volume and section construction.

/// Parameters for building a [`crate::volume::Volume`].
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeParams {
    /// Run the homogeneity test and build the linear Z mapping.
    pub verify_homogeneity: bool,

    /// Allowed deviation between consecutive Z gaps, in world units.
    pub tolerance: f64,

    /// Drop slices that repeat an already seen Z location before sorting.
    pub fix_z_duplicates: bool,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self {
            verify_homogeneity: true,
            tolerance: 1e-4,
            fix_z_duplicates: false,
        }
    }
}

impl VolumeParams {
    /// Skip verification. Z lookups will fail on the resulting volume.
    #[must_use]
    pub fn unverified() -> Self {
        Self {
            verify_homogeneity: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_verification(mut self, verify: bool) -> Self {
        self.verify_homogeneity = verify;
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_fix_z_duplicates(mut self, fix: bool) -> Self {
        self.fix_z_duplicates = fix;
        self
    }
}

/// Parameters for deriving a section frame from a cutting plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionParams {
    /// Angle in radians under which the cutting plane counts as parallel
    /// to the anchor slice.
    pub parallel_tolerance: f64,

    /// Flip the derived axes so that X leans towards `(1, 1, 0)` and Y points
    /// down the world Z axis, whichever intersection point was picked.
    pub canonical_orientation: bool,
}

impl Default for SectionParams {
    fn default() -> Self {
        Self {
            parallel_tolerance: 1e-4,
            canonical_orientation: true,
        }
    }
}

impl SectionParams {
    #[must_use]
    pub const fn with_parallel_tolerance(mut self, tolerance: f64) -> Self {
        self.parallel_tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_canonical_orientation(mut self, canonical: bool) -> Self {
        self.canonical_orientation = canonical;
        self
    }
}
