//! Level catalog loading.

use std::path::Path;

use anyhow::{Context, Result};

use hole_match_core::LevelCatalog;

/// Levels compiled into the binary.
pub const BUILTIN_LEVELS: &str = include_str!("../levels/default.json");

/// Load and validate a catalog from `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<LevelCatalog> {
    let catalog = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read level catalog {}", path.display()))?;
            parse_catalog(&text).with_context(|| format!("load {}", path.display()))?
        }
        None => parse_catalog(BUILTIN_LEVELS).context("load built-in levels")?,
    };
    log::info!("loaded {} levels", catalog.len());
    Ok(catalog)
}

pub fn parse_catalog(text: &str) -> Result<LevelCatalog> {
    let catalog: LevelCatalog = serde_json::from_str(text).context("parse level catalog")?;
    catalog.validate()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hole_match_core::types::{HoleColor, SpecialKind};

    #[test]
    fn builtin_levels_are_valid() {
        let catalog = load_catalog(None).unwrap();
        assert!(catalog.len() >= 3);
    }

    #[test]
    fn minimal_catalog_uses_defaults() {
        let catalog = parse_catalog(
            r#"{"levels":[{
                "columns":[{"holes":[{"color":"red","special":"grouped"},{"color":"blue"}]}],
                "cars":[{"color":"red","start":{"x":0,"y":0,"z":10}},
                        {"color":"blue","start":{"x":3,"y":0,"z":10}}]
            }]}"#,
        )
        .unwrap();
        let level = catalog.get(0).unwrap();
        assert_eq!(level.container_count, 3);
        assert!(level.timed);
        assert_eq!(level.columns[0].holes[0].special, SpecialKind::Grouped);
        assert_eq!(level.cars[1].color, HoleColor::Blue);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(parse_catalog(r#"{"levels":[]}"#).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_catalog(Some(Path::new("/nonexistent/levels.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/levels.json"));
    }
}
