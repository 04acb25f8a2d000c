//! Output layout
//!
//! Client paths are the backslash-separated paths files refer to each other
//! by inside the game archive; output paths are where the same files land
//! below the output root on disk.

use std::path::{Path, PathBuf};

/// Client folder of a zone's world object files.
#[must_use]
pub fn zone_wmo_folder(zone: &str) -> String {
    format!("World\\wmo\\EQ\\{zone}")
}

/// Client path of a zone's root world object.
#[must_use]
pub fn zone_wmo_client_path(zone: &str) -> String {
    format!("{}\\{zone}.wmo", zone_wmo_folder(zone))
}

/// Client folder of a zone's textures.
#[must_use]
pub fn zone_texture_folder(zone: &str) -> String {
    format!("World\\Everquest\\ZoneTextures\\{zone}")
}

/// Client folder of the models generated from a zone's animated surfaces.
#[must_use]
pub fn zone_object_folder(zone: &str) -> String {
    format!("World\\Everquest\\ZoneObjects\\{zone}")
}

#[must_use]
pub fn zone_object_client_path(zone: &str, name: &str) -> String {
    format!("{}\\{name}.m2", zone_object_folder(zone))
}

/// Client folder shared by every static object and its textures.
#[must_use]
pub fn static_object_folder() -> String {
    "World\\Everquest\\StaticObjects".to_string()
}

#[must_use]
pub fn static_object_client_path(name: &str) -> String {
    format!("{}\\{name}.m2", static_object_folder())
}

/// Name of the map a zone is placed on.
#[must_use]
pub fn map_name(zone: &str) -> String {
    format!("EQ_{zone}")
}

/// Turn a client path into a path below `root`.
#[must_use]
pub fn to_output_path(root: &Path, client_path: &str) -> PathBuf {
    client_path
        .split('\\')
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// On-disk locations of every file written for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOutputPaths {
    pub wmo_folder: PathBuf,
    pub map_folder: PathBuf,
    pub zone_object_folder: PathBuf,
    zone: String,
}

impl ZoneOutputPaths {
    #[must_use]
    pub fn new(root: &Path, zone: &str) -> Self {
        Self {
            wmo_folder: to_output_path(root, &zone_wmo_folder(zone)),
            map_folder: root.join("World").join("Maps").join(map_name(zone)),
            zone_object_folder: to_output_path(root, &zone_object_folder(zone)),
            zone: zone.to_string(),
        }
    }

    #[must_use]
    pub fn root_wmo(&self) -> PathBuf {
        self.wmo_folder.join(format!("{}.wmo", self.zone))
    }

    /// Group files are numbered from zero, three digits wide.
    #[must_use]
    pub fn group_wmo(&self, index: usize) -> PathBuf {
        self.wmo_folder.join(format!("{}_{index:03}.wmo", self.zone))
    }

    #[must_use]
    pub fn wdt(&self) -> PathBuf {
        self.map_folder.join(format!("{}.wdt", map_name(&self.zone)))
    }

    #[must_use]
    pub fn wdl(&self) -> PathBuf {
        self.map_folder.join(format!("{}.wdl", map_name(&self.zone)))
    }

    #[must_use]
    pub fn triggers(&self) -> PathBuf {
        self.map_folder.join(format!("{}_triggers.json", self.zone))
    }

    /// Identifier record for the database tool.
    #[must_use]
    pub fn record(&self) -> PathBuf {
        self.map_folder.join(format!("{}.json", map_name(&self.zone)))
    }
}

/// `(m2, skin)` locations of a model named `name` inside `folder`.
#[must_use]
pub fn model_output_paths(folder: &Path, name: &str) -> (PathBuf, PathBuf) {
    (folder.join(format!("{name}.m2")), folder.join(format!("{name}00.skin")))
}

/// Folder static objects are written to.
#[must_use]
pub fn static_object_output_folder(root: &Path) -> PathBuf {
    to_output_path(root, &static_object_folder())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_client_paths() {
        assert_eq!(zone_wmo_client_path("arena"), "World\\wmo\\EQ\\arena\\arena.wmo");
        assert_eq!(
            zone_object_client_path("arena", "ZO_arena_water1"),
            "World\\Everquest\\ZoneObjects\\arena\\ZO_arena_water1.m2"
        );
        assert_eq!(
            static_object_client_path("torch"),
            "World\\Everquest\\StaticObjects\\torch.m2"
        );
    }

    #[test]
    fn test_zone_output_paths() {
        let root = Path::new("out");
        let paths = ZoneOutputPaths::new(root, "arena");
        assert_eq!(paths.root_wmo(), Path::new("out/World/wmo/EQ/arena/arena.wmo"));
        assert_eq!(paths.group_wmo(7), Path::new("out/World/wmo/EQ/arena/arena_007.wmo"));
        assert_eq!(paths.wdt(), Path::new("out/World/Maps/EQ_arena/EQ_arena.wdt"));
        assert_eq!(paths.wdl(), Path::new("out/World/Maps/EQ_arena/EQ_arena.wdl"));
        assert_eq!(
            paths.triggers(),
            Path::new("out/World/Maps/EQ_arena/arena_triggers.json")
        );
    }

    #[test]
    fn test_model_output_paths() {
        let folder = static_object_output_folder(Path::new("out"));
        let (m2, skin) = model_output_paths(&folder, "torch");
        assert_eq!(m2, Path::new("out/World/Everquest/StaticObjects/torch.m2"));
        assert_eq!(skin, Path::new("out/World/Everquest/StaticObjects/torch00.skin"));
    }
}
