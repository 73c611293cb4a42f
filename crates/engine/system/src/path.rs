//! Resource path resolution
//!
//! Game data lives under one resource root:
//!
//! ```text
//! <root>/
//! ├── maps/
//! ├── shaders/
//! └── textures/
//!     ├── img_<id>.png
//!     └── img_dummy.png   (stand-in for missing textures)
//! ```

use std::path::{Path, PathBuf};
use tracing::warn;

/// Directory name used under platform data directories
const APP_DIR: &str = "tessera";

/// Resolves files under the resource root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    root: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl ResourcePaths {
    /// Create a resolver for a resource root
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory for the engine, or `./resources` when the
    /// platform has none
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("resources"))
    }

    /// Get the resource root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root
    pub fn resolve<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.root.join(relative)
    }

    /// Get the maps directory path
    pub fn maps_dir(&self) -> PathBuf {
        self.resolve("maps")
    }

    /// Get the shaders directory path
    pub fn shaders_dir(&self) -> PathBuf {
        self.resolve("shaders")
    }

    /// Get the textures directory path
    pub fn textures_dir(&self) -> PathBuf {
        self.resolve("textures")
    }

    /// Image file for texture `id`
    pub fn texture(&self, id: u32) -> PathBuf {
        self.textures_dir().join(format!("img_{id}.png"))
    }

    /// Image loaded in place of a missing texture
    pub fn dummy_texture(&self) -> PathBuf {
        self.textures_dir().join("img_dummy.png")
    }

    /// Texture file if it exists, otherwise the dummy texture
    pub fn texture_or_dummy(&self, id: u32) -> PathBuf {
        let path = self.texture(id);
        if path.exists() {
            path
        } else {
            warn!(id, path = %path.display(), "Texture missing, using dummy");
            self.dummy_texture()
        }
    }

    /// Create the directory layout under the root
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [self.maps_dir(), self.shaders_dir(), self.textures_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let paths = ResourcePaths::new("/game");
        assert_eq!(paths.root(), Path::new("/game"));
        assert_eq!(paths.resolve("maps/1.bin"), PathBuf::from("/game/maps/1.bin"));
    }

    #[test]
    fn test_standard_directories() {
        let paths = ResourcePaths::new("/game");
        assert_eq!(paths.maps_dir(), PathBuf::from("/game/maps"));
        assert_eq!(paths.shaders_dir(), PathBuf::from("/game/shaders"));
        assert_eq!(paths.textures_dir(), PathBuf::from("/game/textures"));
    }

    #[test]
    fn test_texture_names() {
        let paths = ResourcePaths::new("/game");
        assert_eq!(paths.texture(17), PathBuf::from("/game/textures/img_17.png"));
        assert_eq!(
            paths.dummy_texture(),
            PathBuf::from("/game/textures/img_dummy.png")
        );
    }

    #[test]
    fn test_default_root_is_not_empty() {
        assert!(!ResourcePaths::default().root().as_os_str().is_empty());
    }
}
