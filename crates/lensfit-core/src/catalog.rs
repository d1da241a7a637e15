//! Eyewear frame catalog.
//!
//! The built-in catalog is embedded at compile time from
//! `contrib/catalog/frames.toml` and parsed once per process. Alternate
//! catalogs in the same format can be loaded from disk.

use crate::types::FaceShape;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../../contrib/catalog/frames.toml");

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bad catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog contains no frames")]
    Empty,
    #[error("duplicate frame id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameCategory {
    Eyeglasses,
    Sunglasses,
}

/// Silhouette of the frame front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameStyle {
    Aviator,
    Rectangle,
    Round,
    CatEye,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

/// One catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: FrameCategory,
    pub shape: FrameStyle,
    pub gender: Gender,
    pub price: f32,
    #[serde(default)]
    pub original_price: Option<f32>,
    pub color: String,
    pub material: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub rating: f32,
    pub reviews: u32,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub new: bool,
    pub image: String,
    /// Frame front width in millimetres.
    pub width: f32,
    /// Lens height in millimetres.
    pub height: f32,
    /// Face shapes this frame flatters (a set; order carries no meaning).
    pub suitable_for: Vec<FaceShape>,
    #[serde(default)]
    pub style_points: Vec<String>,
}

impl FrameEntry {
    pub fn suits(&self, shape: FaceShape) -> bool {
        self.suitable_for.contains(&shape)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    frame: Vec<FrameEntry>,
}

/// Immutable table of catalog frames, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    frames: Vec<FrameEntry>,
}

impl Catalog {
    /// Build a catalog from already-constructed entries.
    pub fn new(frames: Vec<FrameEntry>) -> Result<Self, CatalogError> {
        if frames.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for frame in &frames {
            if !seen.insert(frame.id.as_str()) {
                return Err(CatalogError::DuplicateId(frame.id.clone()));
            }
        }
        Ok(Self { frames })
    }

    pub fn from_toml_str(src: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(src)?;
        Self::new(file.frame)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&src)?;
        tracing::info!(path = %path.display(), frames = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// The compiled-in catalog, parsed on first use.
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| match Catalog::from_toml_str(BUILTIN_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "built-in catalog is invalid");
                Catalog::default()
            }
        })
    }

    pub fn frames(&self) -> &[FrameEntry] {
        &self.frames
    }

    pub fn get(&self, id: &str) -> Option<&FrameEntry> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_FRAME: &str = r#"
        [[frame]]
        id = "a"
        name = "Test"
        brand = "Acme"
        category = "eyeglasses"
        shape = "cat-eye"
        gender = "women"
        price = 10.0
        color = "Red"
        material = "Acetate"
        rating = 4.0
        reviews = 3
        image = "a.png"
        width = 140.0
        height = 50.0
        suitable_for = ["heart"]
    "#;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 5);
        let ids: HashSet<_> = catalog.frames().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_builtin_catalog_fields() {
        let cat_eye = Catalog::builtin().get("3").unwrap();
        assert_eq!(cat_eye.shape, FrameStyle::CatEye);
        assert_eq!(cat_eye.gender, Gender::Women);
        assert!(cat_eye.suits(FaceShape::Diamond));
        assert!(!cat_eye.suits(FaceShape::Square));
        assert_eq!(cat_eye.original_price, Some(220.0));

        let aviator = Catalog::builtin().get("1").unwrap();
        assert!(aviator.bestseller);
        assert!(!aviator.new);
    }

    #[test]
    fn test_optional_fields_default() {
        let catalog = Catalog::from_toml_str(ONE_FRAME).unwrap();
        let frame = &catalog.frames()[0];
        assert_eq!(frame.original_price, None);
        assert!(frame.features.is_empty());
        assert!(frame.style_points.is_empty());
        assert!(!frame.bestseller);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(Catalog::from_toml_str(""), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let src = format!("{ONE_FRAME}\n{ONE_FRAME}");
        assert!(matches!(
            Catalog::from_toml_str(&src),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_unknown_face_shape_rejected() {
        let src = ONE_FRAME.replace(r#"["heart"]"#, r#"["triangle"]"#);
        assert!(matches!(Catalog::from_toml_str(&src), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load("/nonexistent/frames.toml").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
