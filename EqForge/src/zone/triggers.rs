//! Area triggers built from zone line boxes
//!
//! Triggers are written as JSON next to the map files for the database tool
//! that registers them.

use serde::{Deserialize, Serialize};

use super::properties::{ZoneLineBox, ZoneProperties};
use crate::common::{BoundingBox, Vec3};

/// A box-shaped area trigger, in destination units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaTrigger {
    pub target_zone: String,
    pub target_position: Vec3,
    /// Facing on arrival, radians.
    pub target_orientation: f32,
    /// Centre of the box.
    pub position: Vec3,
    /// Extent along X.
    pub length: f32,
    /// Extent along Y.
    pub width: f32,
    /// Extent along Z.
    pub height: f32,
    pub orientation: f32,
}

impl AreaTrigger {
    /// Scale `line` by `world_scale` and convert its corners to centre and extents.
    #[must_use]
    pub fn from_zone_line(line: &ZoneLineBox, world_scale: f32) -> Self {
        let bounds = BoundingBox::from_points(
            [
                line.box_top_northwest * world_scale,
                line.box_bottom_southeast * world_scale,
            ],
            0.0,
        );
        let extents = bounds.extents();
        Self {
            target_zone: line.target_zone.clone(),
            target_position: line.target_position * world_scale,
            target_orientation: line.target_orientation.radians(),
            position: bounds.center(),
            length: extents.x,
            width: extents.y,
            height: extents.z,
            orientation: 0.0,
        }
    }
}

/// Triggers for every zone line of `properties`.
#[must_use]
pub fn area_triggers(properties: &ZoneProperties, world_scale: f32) -> Vec<AreaTrigger> {
    properties
        .zone_lines
        .iter()
        .map(|line| AreaTrigger::from_zone_line(line, world_scale))
        .collect()
}
