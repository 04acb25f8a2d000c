//! Zones
//!
//! A zone becomes one global world object (root plus groups) on its own map,
//! a set of models for its animated surfaces, and area triggers for its zone
//! lines.

pub mod lights;
pub mod properties;
pub mod triggers;
pub mod world;

pub use lights::{LightInstance, parse_light_instances, read_light_instances};
pub use properties::{Continent, FogProperties, LineOrientation, ZoneCatalog, ZoneLineBox, ZoneProperties};
pub use triggers::{AreaTrigger, area_triggers};
pub use world::{ZoneRecord, ZoneWorld, build_zone};
