//! Level definitions as loaded from the catalog file.

use serde::{Deserialize, Serialize};

use crate::error::LevelDataError;
use crate::layout::Layout;
use crate::types::{
    HoleColor, SpecialKind, Vec3, DEFAULT_CONTAINER_COUNT, DEFAULT_TIME_LIMIT_SECS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleData {
    pub color: HoleColor,
    #[serde(default)]
    pub special: SpecialKind,
    #[serde(default)]
    pub mystery: bool,
}

impl HoleData {
    pub fn plain(color: HoleColor) -> Self {
        Self {
            color,
            special: SpecialKind::None,
            mystery: false,
        }
    }

    pub fn grouped(color: HoleColor) -> Self {
        Self {
            special: SpecialKind::Grouped,
            ..Self::plain(color)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    #[serde(default)]
    pub holes: Vec<HoleData>,
}

fn default_model() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarData {
    pub color: HoleColor,
    #[serde(default = "default_model")]
    pub model: u8,
    pub start: Vec3,
    /// Waypoints towards the junction in front of the containers.
    #[serde(default)]
    pub path: Vec<Vec3>,
}

impl CarData {
    pub fn new(color: HoleColor, start: Vec3) -> Self {
        Self {
            color,
            model: default_model(),
            start,
            path: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub name: Option<String>,
    pub columns: Vec<ColumnData>,
    pub container_count: usize,
    pub timed: bool,
    pub time_limit_secs: u32,
    pub cars: Vec<CarData>,
}

impl Default for LevelData {
    fn default() -> Self {
        Self {
            name: None,
            columns: Vec::new(),
            container_count: DEFAULT_CONTAINER_COUNT,
            timed: true,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            cars: Vec::new(),
        }
    }
}

impl LevelData {
    /// Reject data a level cannot be built from; log data that builds but
    /// can never be finished.
    pub fn validate(&self) -> Result<(), LevelDataError> {
        if self.columns.is_empty() {
            return Err(LevelDataError::NoColumns);
        }
        if self.container_count == 0 {
            return Err(LevelDataError::NoContainers);
        }
        if self.cars.is_empty() {
            return Err(LevelDataError::NoCars);
        }
        if self.timed && self.time_limit_secs == 0 {
            return Err(LevelDataError::ZeroTimeLimit);
        }

        for color in HoleColor::ALL {
            let holes = self
                .columns
                .iter()
                .flat_map(|c| &c.holes)
                .filter(|h| h.color == color)
                .count();
            let cars = self.cars.iter().filter(|c| c.color == color).count();
            if holes > 0 && cars == 0 {
                log::warn!("level has {holes} {color} hole(s) but no {color} car");
            }
            if cars > holes {
                log::warn!("level has {cars} {color} car(s) but only {holes} hole(s)");
            }
        }
        Ok(())
    }
}

/// Every level of the game in play order, plus shared board geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    pub layout: Layout,
    pub levels: Vec<LevelData>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelData>) -> Self {
        Self {
            layout: Layout::default(),
            levels,
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Clamp a requested index into the catalog. Out-of-range requests loop
    /// back to the first level.
    pub fn resolve_index(&self, index: usize) -> usize {
        if index < self.levels.len() {
            index
        } else {
            0
        }
    }

    pub fn get(&self, index: usize) -> Option<&LevelData> {
        self.levels.get(index)
    }

    pub fn validate(&self) -> Result<(), LevelDataError> {
        if self.levels.is_empty() {
            return Err(LevelDataError::EmptyCatalog);
        }
        for (i, level) in self.levels.iter().enumerate() {
            level.validate().inspect_err(|e| {
                log::error!("level {i} is invalid: {e}");
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let json = r#"{
            "columns": [ { "holes": [ { "color": "red" } ] } ],
            "cars": [ { "color": "red", "start": { "x": 0.0, "y": 0.0, "z": 10.0 } } ]
        }"#;
        let level: LevelData = serde_json::from_str(json).unwrap();
        assert_eq!(level.container_count, DEFAULT_CONTAINER_COUNT);
        assert!(level.timed);
        assert_eq!(level.time_limit_secs, DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(level.columns[0].holes[0].special, SpecialKind::None);
        assert_eq!(level.cars[0].model, 1);
        assert!(level.validate().is_ok());
    }

    #[test]
    fn validation_rejects_unplayable_levels() {
        let mut level = LevelData::default();
        assert_eq!(level.validate(), Err(LevelDataError::NoColumns));

        level.columns.push(ColumnData::default());
        level.container_count = 0;
        assert_eq!(level.validate(), Err(LevelDataError::NoContainers));

        level.container_count = 2;
        assert_eq!(level.validate(), Err(LevelDataError::NoCars));

        level.cars.push(CarData::new(HoleColor::Red, Vec3::ZERO));
        level.time_limit_secs = 0;
        assert_eq!(level.validate(), Err(LevelDataError::ZeroTimeLimit));

        level.timed = false;
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn out_of_range_index_loops_to_first() {
        let catalog = LevelCatalog::new(vec![LevelData::default(), LevelData::default()]);
        assert_eq!(catalog.resolve_index(1), 1);
        assert_eq!(catalog.resolve_index(2), 0);
        assert_eq!(catalog.resolve_index(usize::MAX), 0);
    }

    #[test]
    fn empty_catalog_is_invalid() {
        assert_eq!(LevelCatalog::default().validate(), Err(LevelDataError::EmptyCatalog));
    }
}
