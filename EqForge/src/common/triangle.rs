//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::Vec3;
use crate::error::{Error, Result};

/// Three vertex indices plus the material they are drawn with.
///
/// `(v1, v2, v3)` is the front-face winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TriangleFace {
    pub material: u32,
    pub v1: u32,
    pub v2: u32,
    pub v3: u32,
}

impl TriangleFace {
    #[must_use]
    pub const fn new(material: u32, v1: u32, v2: u32, v3: u32) -> Self {
        Self { material, v1, v2, v3 }
    }

    #[must_use]
    pub const fn indices(&self) -> [u32; 3] {
        [self.v1, self.v2, self.v3]
    }

    #[must_use]
    pub const fn with_indices(self, [v1, v2, v3]: [u32; 3]) -> Self {
        Self { v1, v2, v3, ..self }
    }

    #[must_use]
    pub const fn with_material(self, material: u32) -> Self {
        Self { material, ..self }
    }

    /// Swap V1 and V3, flipping the facing direction.
    #[must_use]
    pub const fn with_reversed_winding(self) -> Self {
        Self {
            v1: self.v3,
            v3: self.v1,
            ..self
        }
    }

    /// Shift every index by `offset`.
    #[must_use]
    pub const fn offset_by(self, offset: u32) -> Self {
        Self {
            v1: self.v1 + offset,
            v2: self.v2 + offset,
            v3: self.v3 + offset,
            ..self
        }
    }

    #[must_use]
    pub fn min_index(&self) -> u32 {
        self.v1.min(self.v2).min(self.v3)
    }

    #[must_use]
    pub fn max_index(&self) -> u32 {
        self.v1.max(self.v2).max(self.v3)
    }

    /// Average of the three corner positions.
    #[must_use]
    pub fn centroid(&self, positions: &[Vec3]) -> Vec3 {
        (positions[self.v1 as usize] + positions[self.v2 as usize] + positions[self.v3 as usize])
            / 3.0
    }

    /// Narrow the indices to the on-disk 16-bit form.
    pub fn to_u16(&self) -> Result<[u16; 3]> {
        let narrow = |index: u32| {
            u16::try_from(index).map_err(|_| Error::GroupVertexOverflow {
                vertex_count: index as usize + 1,
                limit: u16::MAX as usize,
            })
        };
        Ok([narrow(self.v1)?, narrow(self.v2)?, narrow(self.v3)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_winding() {
        let face = TriangleFace::new(2, 10, 11, 12).with_reversed_winding();
        assert_eq!(face.indices(), [12, 11, 10]);
        assert_eq!(face.material, 2);
    }

    #[test]
    fn test_to_u16_rejects_wide_index() {
        assert!(TriangleFace::new(0, 1, 2, 65535).to_u16().is_ok());
        assert!(matches!(
            TriangleFace::new(0, 1, 2, 65536).to_u16(),
            Err(Error::GroupVertexOverflow { .. })
        ));
    }

    #[test]
    fn test_centroid() {
        let positions = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 3.0)];
        let centroid = TriangleFace::new(0, 0, 1, 2).centroid(&positions);
        assert_eq!(centroid, Vec3::new(1.0, 1.0, 1.0));
    }
}
