//! Light instance lists
//!
//! One light per line: `x, y, z, radius, r, g, b` with color channels in the
//! unit range. Blank lines and lines starting with `#` are ignored.

use std::fs;
use std::path::Path;

use crate::common::{ColorRgba, Vec3};
use crate::error::{Error, Result};
use crate::formats::wmo::WmoLight;
use crate::mesh::to_wow_position;

const LIGHT_FIELDS: usize = 7;

/// A point light in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInstance {
    pub position: Vec3,
    pub radius: f32,
    /// Unit-range RGB.
    pub color: Vec3,
}

impl LightInstance {
    /// Convert to a world-object light in destination space.
    #[must_use]
    pub fn to_wmo_light(&self, world_scale: f32) -> WmoLight {
        WmoLight {
            color: ColorRgba::from_unit_rgb(self.color.x, self.color.y, self.color.z),
            position: to_wow_position(self.position, world_scale),
            intensity: 1.0,
            attenuation_start: 0.0,
            attenuation_end: self.radius * world_scale,
        }
    }
}

/// Read the light list at `path`. A missing file yields no lights.
pub fn read_light_instances(path: &Path) -> Result<Vec<LightInstance>> {
    if !path.exists() {
        tracing::debug!("No light instances at {}", path.display());
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(parse_light_instances(&text, path))
}

/// Parse every well-formed row of `text`; malformed rows are logged and skipped.
#[must_use]
pub fn parse_light_instances(text: &str, path: &Path) -> Vec<LightInstance> {
    let mut lights = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_light_line(line, path, number + 1) {
            Ok(light) => lights.push(light),
            Err(err) => tracing::warn!("Skipping light instance: {}", err),
        }
    }
    lights
}

fn parse_light_line(line: &str, path: &Path, number: usize) -> Result<LightInstance> {
    let invalid = |message: String| Error::InvalidLightInstance {
        path: path.to_path_buf(),
        line: number,
        message,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != LIGHT_FIELDS {
        return Err(invalid(format!(
            "expected {LIGHT_FIELDS} comma separated values, found {}",
            fields.len()
        )));
    }
    let mut values = [0.0_f32; LIGHT_FIELDS];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field
            .parse()
            .map_err(|_| invalid(format!("'{field}' is not a number")))?;
    }
    let [x, y, z, radius, r, g, b] = values;
    Ok(LightInstance {
        position: Vec3::new(x, y, z),
        radius,
        color: Vec3::new(r, g, b),
    })
}
