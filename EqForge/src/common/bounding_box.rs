//! Axis-aligned bounding volumes
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::{ToBytes, Vec3};

/// Largest seam overlap as a fraction of the axis being split.
const MAX_OVERLAP_FRACTION: f32 = 0.125;

/// Axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box around `points`, pushed outward by `padding` on every side.
    ///
    /// Each extent is therefore at least `2 * padding`, which keeps single
    /// points and flat meshes from producing a zero-volume box. An empty
    /// set yields a cube of half-size `padding` around the origin.
    #[must_use]
    pub fn from_points<I>(points: I, padding: f32) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut any = false;
        for point in points {
            min = min.min(point);
            max = max.max(point);
            any = true;
        }
        if !any {
            min = Vec3::ZERO;
            max = Vec3::ZERO;
        }
        let padding = Vec3::splat(padding.max(0.0));
        Self::new(min - padding, max + padding)
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extents (max - min).
    #[must_use]
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Distance from the center to the furthest corner, used as a bounding-sphere radius.
    #[must_use]
    pub fn furthest_point_distance_from_center(&self) -> f32 {
        self.center().distance(self.max)
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Half-open XY membership: `min <= p < max` on X and Y, Z ignored.
    #[must_use]
    pub fn contains_xy_half_open(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Smallest box holding both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Split at the midpoint of the wider horizontal axis (X on ties).
    ///
    /// Both halves are widened by `overlap` across the cut, so triangles near
    /// the seam may land in both. The overlap is capped at an eighth of the
    /// split axis so each half is at most 5/8 of the parent.
    #[must_use]
    pub fn split_xy(&self, overlap: f32) -> (Self, Self) {
        let extents = self.extents();
        let (mut lower, mut upper) = (*self, *self);
        if extents.x >= extents.y {
            let overlap = overlap.max(0.0).min(extents.x * MAX_OVERLAP_FRACTION);
            let mid = self.min.x + extents.x * 0.5;
            lower.max.x = (mid + overlap).min(self.max.x);
            upper.min.x = (mid - overlap).max(self.min.x);
        } else {
            let overlap = overlap.max(0.0).min(extents.y * MAX_OVERLAP_FRACTION);
            let mid = self.min.y + extents.y * 0.5;
            lower.max.y = (mid + overlap).min(self.max.y);
            upper.min.y = (mid - overlap).max(self.min.y);
        }
        (lower, upper)
    }

    /// Low resolution form: six `i16`, rounded outward and clamped.
    pub fn write_low_res(&self, out: &mut Vec<u8>) {
        let down = |v: f32| v.floor().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        let up = |v: f32| v.ceil().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        for value in [
            down(self.min.x),
            down(self.min.y),
            down(self.min.z),
            up(self.max.x),
            up(self.max.y),
            up(self.max.z),
        ] {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

impl ToBytes for BoundingBox {
    const SIZE: usize = 24;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        self.min.write_bytes(out);
        self.max.write_bytes(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point_gets_padded() {
        let bbox = BoundingBox::from_points([Vec3::new(5.0, 5.0, 5.0)], 0.5);
        let extents = bbox.extents();
        assert!(extents.x >= 0.5 && extents.y >= 0.5 && extents.z >= 0.5);
        assert!(bbox.contains(Vec3::new(5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_empty_set_is_not_degenerate() {
        let bbox = BoundingBox::from_points(std::iter::empty(), 1.0);
        assert_eq!(bbox.extents(), Vec3::splat(2.0));
        assert_eq!(bbox.center(), Vec3::ZERO);
    }

    #[test]
    fn test_contains_all_points_with_padding_floor() {
        let points = [
            Vec3::new(-3.0, 2.0, 0.0),
            Vec3::new(4.0, 2.0, 0.0),
            Vec3::new(1.0, 2.5, 0.0),
        ];
        let padding = 0.25;
        let bbox = BoundingBox::from_points(points, padding);
        for point in points {
            assert!(bbox.contains(point));
        }
        assert!(bbox.extents().cmpge(Vec3::splat(padding)).all());
    }

    #[test]
    fn test_furthest_point_distance() {
        let bbox = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!((bbox.furthest_point_distance_from_center() - 3f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_split_along_wider_axis() {
        let bbox = BoundingBox::new(Vec3::ZERO, Vec3::new(10.0, 4.0, 1.0));
        let (lower, upper) = bbox.split_xy(0.5);
        assert_eq!(lower.max.x, 5.5);
        assert_eq!(upper.min.x, 4.5);
        assert_eq!(lower.max.y, 4.0);

        let tall = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 8.0, 1.0));
        let (lower, upper) = tall.split_xy(0.0);
        assert_eq!(lower.max.y, 4.0);
        assert_eq!(upper.min.y, 4.0);
    }

    #[test]
    fn test_split_overlap_is_capped_by_extent() {
        let small = BoundingBox::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.0));
        let (lower, upper) = small.split_xy(0.5);
        assert_eq!(lower.max.x, 0.625);
        assert_eq!(upper.min.x, 0.375);
        assert!(lower.extents().x < small.extents().x);
    }

    #[test]
    fn test_low_res_rounds_outward() {
        let bbox = BoundingBox::new(Vec3::new(-1.5, 0.2, 0.0), Vec3::new(1.2, 0.8, 70000.0));
        let mut out = Vec::new();
        bbox.write_low_res(&mut out);
        let values: Vec<i16> = out
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(values, vec![-2, 0, 0, 2, 1, i16::MAX]);
    }
}
