//! The document: an ordered set of fitted paths plus edit history.
//!
//! Tools never touch the path list directly. Intermediate drag states go
//! through [`Sketch::set_live`], finished edits through [`Sketch::commit`],
//! which is the only place history is recorded.

use kurbo::Point;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::edit::{rebuild_handles, Handle};
use crate::error::BrushError;
use crate::nearest::{nearest_parameter, SearchParams};
use crate::path::Path;

/// A reversible change to the path list.
#[derive(Debug, Clone)]
enum Edit {
    Insert { index: usize, path: Path },
    Replace { index: usize, before: Path, after: Path },
    Clear { paths: Vec<Path> },
}

impl Edit {
    fn revert(&self, paths: &mut Vec<Path>) {
        match self {
            Edit::Insert { index, .. } => {
                if *index < paths.len() {
                    paths.remove(*index);
                }
            }
            Edit::Replace { index, before, .. } => {
                if let Some(slot) = paths.get_mut(*index) {
                    *slot = before.clone();
                }
            }
            Edit::Clear { paths: cleared } => *paths = cleared.clone(),
        }
    }

    fn apply(&self, paths: &mut Vec<Path>) {
        match self {
            Edit::Insert { index, path } => {
                let at = (*index).min(paths.len());
                paths.insert(at, path.clone());
            }
            Edit::Replace { index, after, .. } => {
                if let Some(slot) = paths.get_mut(*index) {
                    *slot = after.clone();
                }
            }
            Edit::Clear { .. } => paths.clear(),
        }
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Default)]
struct History {
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
}

impl History {
    fn record(&mut self, edit: Edit, limit: usize) {
        self.redo_stack.clear();
        if limit == 0 {
            return;
        }
        self.undo_stack.push(edit);
        if self.undo_stack.len() > limit {
            let excess = self.undo_stack.len() - limit;
            self.undo_stack.drain(..excess);
        }
    }
}

#[derive(Debug, Default)]
pub struct Sketch {
    paths: Vec<Path>,
    config: EditorConfig,
    history: History,
}

impl Sketch {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            paths: Vec::new(),
            config,
            history: History::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Append a finished path and return its index.
    pub fn add_path(&mut self, path: Path) -> usize {
        let index = self.paths.len();
        info!(index, elements = path.element_count(), "added path");
        self.paths.push(path.clone());
        self.history
            .record(Edit::Insert { index, path }, self.config.undo_limit);
        index
    }

    /// Editing handles of path `index`.
    pub fn handles(&self, index: usize) -> Option<Vec<Handle>> {
        self.paths.get(index).map(rebuild_handles)
    }

    /// Index of the path closest to `pos`, ranked with a coarse search.
    ///
    /// Paths farther than `pick_distance` are never returned.
    pub fn nearest_path(&self, pos: Point) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, path) in self.paths.iter().enumerate() {
            let Some(hit) = nearest_parameter(path, pos, SearchParams::coarse()) else {
                continue;
            };
            if best.map_or(true, |(_, d)| hit.distance < d) {
                best = Some((i, hit.distance));
            }
        }
        best.filter(|&(_, d)| d <= self.config.pick_distance)
            .map(|(i, _)| i)
    }

    /// Replace path `index` without recording history (drag previews).
    pub fn set_live(&mut self, index: usize, path: Path) -> Result<(), BrushError> {
        let len = self.paths.len();
        let slot = self.paths.get_mut(index).ok_or(BrushError::InvalidRange {
            start: index,
            end: index.saturating_add(1),
            len,
        })?;
        *slot = path;
        Ok(())
    }

    /// Finish an edit of path `index` that started from `before`.
    ///
    /// Unchanged edits leave history alone.
    pub fn commit(&mut self, index: usize, before: Path, after: Path) -> Result<(), BrushError> {
        self.set_live(index, after.clone())?;
        if before == after {
            debug!(index, "edit left path unchanged");
            return Ok(());
        }
        info!(index, elements = after.element_count(), "committed edit");
        self.history.record(
            Edit::Replace {
                index,
                before,
                after,
            },
            self.config.undo_limit,
        );
        Ok(())
    }

    /// Rasterize and re-trace every path with the current config.
    ///
    /// Nothing is replaced if any path fails. Returns the number of paths
    /// that changed.
    pub fn refit_all(&mut self) -> Result<usize, BrushError> {
        let mut refitted = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let points = path.resample();
            if points.len() < 2 {
                refitted.push(path.clone());
                continue;
            }
            refitted.push(crate::trace(&points, &self.config)?);
        }

        let mut changed = 0;
        for (index, after) in refitted.into_iter().enumerate() {
            let before = self.paths[index].clone();
            if before != after {
                self.commit(index, before, after)?;
                changed += 1;
            }
        }
        info!(changed, total = self.paths.len(), "refitted all paths");
        Ok(changed)
    }

    /// Remove every path as one undoable step.
    pub fn clear(&mut self) {
        if self.paths.is_empty() {
            return;
        }
        let paths = std::mem::take(&mut self.paths);
        self.history
            .record(Edit::Clear { paths }, self.config.undo_limit);
    }

    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Revert the most recent edit. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.history.undo_stack.pop() else {
            return false;
        };
        edit.revert(&mut self.paths);
        debug!(?edit, "undo");
        self.history.redo_stack.push(edit);
        true
    }

    /// Re-apply the most recently undone edit. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        let Some(edit) = self.history.redo_stack.pop() else {
            return false;
        };
        edit.apply(&mut self.paths);
        debug!(?edit, "redo");
        self.history.undo_stack.push(edit);
        true
    }
}
