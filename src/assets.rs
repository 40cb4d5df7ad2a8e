//! Sprite catalog
//!
//! Sprites are loaded once at startup and shared read-only afterwards. The
//! simulation only ever sees a [`SpriteHandle`] (key + size); pixel data stays
//! in the catalog for the renderer.
//!
//! Sprite files are JSON: a palette of single-character keys and a list of
//! equal-length rows. `.` and space are transparent.
//!
//! ```json
//! { "palette": { "Y": [245, 200, 66] }, "rows": [".YY.", "YYYY"] }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Every sprite the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKey {
    Bird,
    PipeTop,
    PipeBottom,
    Ground,
}

impl SpriteKey {
    pub const ALL: [SpriteKey; 4] = [
        SpriteKey::Bird,
        SpriteKey::PipeTop,
        SpriteKey::PipeBottom,
        SpriteKey::Ground,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteKey::Bird => "bird",
            SpriteKey::PipeTop => "pipe_top",
            SpriteKey::PipeBottom => "pipe_bottom",
            SpriteKey::Ground => "ground",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Path of this sprite relative to the resource directory
    pub fn relative_path(&self) -> PathBuf {
        Path::new("sprites").join(format!("{}.json", self.as_str()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetError {
    /// File does not exist
    Missing { path: PathBuf },
    /// Name does not match any [`SpriteKey`]
    UnknownKey { name: String },
    /// File exists but could not be read
    Io { path: PathBuf, message: String },
    /// File was read but is not a valid sprite
    Malformed { path: PathBuf, reason: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "sprite file '{}' not found", path.display()),
            Self::UnknownKey { name } => write!(f, "unknown sprite '{}'", name),
            Self::Io { path, message } => {
                write!(f, "could not read '{}': {}", path.display(), message)
            }
            Self::Malformed { path, reason } => {
                write!(f, "malformed sprite '{}': {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for AssetError {}

/// On-disk sprite layout
#[derive(Debug, Deserialize)]
struct SpriteFile {
    palette: BTreeMap<String, Rgb>,
    rows: Vec<String>,
}

/// Decoded sprite pixels (`None` = transparent)
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<Option<Rgb>>,
}

impl Sprite {
    /// A fully opaque rectangle
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![Some(color); (width * height) as usize],
        }
    }

    /// Decode sprite JSON; `path` is only used for error messages
    pub fn parse(json: &str, path: &Path) -> Result<Self, AssetError> {
        let malformed = |reason: String| AssetError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let file: SpriteFile = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

        let mut palette = HashMap::with_capacity(file.palette.len());
        for (key, color) in file.palette {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c != '.' && c != ' ' => {
                    palette.insert(c, color);
                }
                _ => return Err(malformed(format!("bad palette key '{}'", key))),
            }
        }

        let height = file.rows.len() as u32;
        let width = file.rows.first().map(|r| r.chars().count()).unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(malformed("sprite has no pixels".to_string()));
        }

        let mut pixels = Vec::with_capacity((width * height) as usize);
        for (y, row) in file.rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(malformed(format!("row {} is not {} wide", y, width)));
            }
            for c in row.chars() {
                match c {
                    '.' | ' ' => pixels.push(None),
                    c => match palette.get(&c) {
                        Some(color) => pixels.push(Some(*color)),
                        None => {
                            return Err(malformed(format!("row {} uses unknown colour '{}'", y, c)));
                        }
                    },
                }
            }
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Read and decode a sprite file
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                AssetError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            }
        })?;
        Self::parse(&json, path)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Pixel at (x, y); transparent when out of bounds
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.pixels[(y as u32 * self.width + x as u32) as usize]
    }
}

/// What an entity holds: which sprite, and how big it is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteHandle {
    pub key: SpriteKey,
    pub size: Vec2,
}

/// All loaded sprites
#[derive(Debug, Clone, Default)]
pub struct SpriteCatalog {
    sprites: HashMap<SpriteKey, Sprite>,
}

impl SpriteCatalog {
    /// Catalog with no sprites; every entity ends up spriteless
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every known sprite from `<resource_dir>/sprites/`.
    ///
    /// Sprites that fail to load are left out and logged.
    pub fn load_dir(resource_dir: &Path) -> Self {
        let mut catalog = Self::empty();
        for key in SpriteKey::ALL {
            let path = resource_dir.join(key.relative_path());
            match Sprite::load(&path) {
                Ok(sprite) => {
                    log::info!(
                        "Loaded sprite from '{}' ({}x{})",
                        path.display(),
                        sprite.width(),
                        sprite.height()
                    );
                    catalog.insert(key, sprite);
                }
                Err(e) => log::warn!("{}, drawing '{}' without a sprite", e, key.as_str()),
            }
        }
        catalog
    }

    /// Solid-colour stand-ins with the shipped sprite sizes (headless runs, tests)
    pub fn placeholder() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(SpriteKey::Bird, Sprite::solid(17, 12, Rgb(245, 200, 66)));
        catalog.insert(SpriteKey::PipeTop, Sprite::solid(26, 160, Rgb(100, 170, 40)));
        catalog.insert(SpriteKey::PipeBottom, Sprite::solid(26, 160, Rgb(100, 170, 40)));
        catalog.insert(SpriteKey::Ground, Sprite::solid(200, 20, Rgb(210, 185, 110)));
        catalog
    }

    pub fn insert(&mut self, key: SpriteKey, sprite: Sprite) {
        self.sprites.insert(key, sprite);
    }

    pub fn sprite(&self, key: SpriteKey) -> Option<&Sprite> {
        self.sprites.get(&key)
    }

    /// Handle for a loaded sprite, `None` if it failed to load
    pub fn handle(&self, key: SpriteKey) -> Option<SpriteHandle> {
        self.sprites.get(&key).map(|sprite| SpriteHandle {
            key,
            size: sprite.size(),
        })
    }

    /// Handle by name; unknown names behave like missing sprites
    pub fn lookup(&self, name: &str) -> Option<SpriteHandle> {
        match SpriteKey::from_name(name) {
            Some(key) => self.handle(key),
            None => {
                log::warn!(
                    "{}",
                    AssetError::UnknownKey {
                        name: name.to_string()
                    }
                );
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
