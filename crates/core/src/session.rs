//! Session: level catalog, progress and the currently running level.

use crate::animator::{Animator, TweenTimings};
use crate::error::{LevelDataError, MoveError, ProgressError};
use crate::level::Level;
use crate::level_data::LevelCatalog;
use crate::probe::{CorridorProbe, PathProbe};
use crate::resolver::TapOutcome;
use crate::snapshot::LevelSnapshot;
use crate::types::{LevelEvent, LevelStatus};

/// Persists which level the player is on.
pub trait ProgressStore {
    /// Saved level index, `None` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<usize>, ProgressError>;
    fn save(&mut self, level_index: usize) -> Result<(), ProgressError>;
}

/// Keeps progress in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgress {
    saved: Option<usize>,
}

impl MemoryProgress {
    pub fn new(saved: Option<usize>) -> Self {
        Self { saved }
    }

    pub fn saved(&self) -> Option<usize> {
        self.saved
    }
}

impl ProgressStore for MemoryProgress {
    fn load(&mut self) -> Result<Option<usize>, ProgressError> {
        Ok(self.saved)
    }

    fn save(&mut self, level_index: usize) -> Result<(), ProgressError> {
        self.saved = Some(level_index);
        Ok(())
    }
}

type Collaborators = (Box<dyn PathProbe>, Box<dyn Animator>);

pub struct Session<P: ProgressStore> {
    catalog: LevelCatalog,
    progress: P,
    index: usize,
    level: Option<Level>,
    events: Vec<LevelEvent>,
    collaborators: Box<dyn Fn() -> Collaborators>,
}

impl<P: ProgressStore> Session<P> {
    pub fn new(catalog: LevelCatalog, progress: P) -> Self {
        Self {
            catalog,
            progress,
            index: 0,
            level: None,
            events: Vec::new(),
            collaborators: Box::new(|| {
                (
                    Box::new(CorridorProbe::default()) as Box<dyn PathProbe>,
                    Box::new(TweenTimings::default()) as Box<dyn Animator>,
                )
            }),
        }
    }

    /// Use custom probe / animator for every level this session loads.
    pub fn with_collaborators(mut self, make: impl Fn() -> Collaborators + 'static) -> Self {
        self.collaborators = Box::new(make);
        self
    }

    /// Load the saved level (or the first one).
    pub fn start(&mut self) -> Result<(), LevelDataError> {
        let saved = match self.progress.load() {
            Ok(saved) => saved.unwrap_or(0),
            Err(e) => {
                log::warn!("could not read progress, starting from the first level: {e}");
                0
            }
        };
        self.load_level(saved)
    }

    /// Replace the running level. Out-of-range indices loop back to 0.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelDataError> {
        let resolved = self.catalog.resolve_index(index);
        if resolved != index {
            log::info!("level {index} does not exist, looping back to level {resolved}");
            self.save_progress(resolved);
        }
        let data = self.catalog.get(resolved).ok_or(LevelDataError::EmptyCatalog)?;
        let (probe, animator) = (self.collaborators)();
        let level = Level::with_collaborators(data, self.catalog.layout, probe, animator)?;

        if let Some(mut old) = self.level.take() {
            old.teardown();
        }
        self.events.clear();
        self.index = resolved;
        self.level = Some(level);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), LevelDataError> {
        self.load_level(self.index)
    }

    pub fn next_level(&mut self) -> Result<(), LevelDataError> {
        self.load_level(self.index + 1)
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        if let Some(level) = self.level.as_mut() {
            level.tick(elapsed_ms);
        }
        self.pump_events();
    }

    pub fn tap_column(&mut self, column: usize) -> Result<TapOutcome, MoveError> {
        let result = match self.level.as_mut() {
            Some(level) => level.tap_column(column),
            None => Err(MoveError::LevelOver),
        };
        self.pump_events();
        result
    }

    fn pump_events(&mut self) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let mut won = false;
        for event in level.drain_events() {
            won |= event == LevelEvent::LevelWon;
            self.events.push(event);
        }
        if won {
            self.save_progress(self.index + 1);
        }
    }

    fn save_progress(&mut self, index: usize) {
        if let Err(e) = self.progress.save(index) {
            log::warn!("could not save progress: {e}");
        }
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, LevelEvent> {
        self.events.drain(..)
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    pub fn status(&self) -> Option<LevelStatus> {
        self.level.as_ref().map(Level::status)
    }

    pub fn snapshot_into(&self, out: &mut LevelSnapshot) -> bool {
        match self.level.as_ref() {
            Some(level) => {
                level.snapshot_into(out);
                true
            }
            None => false,
        }
    }

    /// Zero-based index of the running level.
    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn level_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level_data::{CarData, ColumnData, HoleData, LevelData};
    use crate::types::{HoleColor, Vec3};

    fn catalog(n: usize) -> LevelCatalog {
        let level = LevelData {
            columns: vec![ColumnData {
                holes: vec![HoleData::plain(HoleColor::Red)],
            }],
            container_count: 1,
            timed: false,
            cars: vec![CarData::new(HoleColor::Red, Vec3::new(0.0, 0.0, 10.0))],
            ..LevelData::default()
        };
        LevelCatalog::new(vec![level; n])
    }

    #[test]
    fn start_resumes_saved_level() {
        let mut session = Session::new(catalog(3), MemoryProgress::new(Some(2)));
        session.start().unwrap();
        assert_eq!(session.level_index(), 2);
    }

    #[test]
    fn out_of_range_loops_and_saves() {
        let mut session = Session::new(catalog(2), MemoryProgress::new(Some(7)));
        session.start().unwrap();
        assert_eq!(session.level_index(), 0);
        assert_eq!(session.progress().saved(), Some(0));
    }

    #[test]
    fn tap_without_level_is_rejected() {
        let mut session = Session::new(catalog(1), MemoryProgress::default());
        assert_eq!(session.tap_column(0), Err(MoveError::LevelOver));
    }
}
