//! Pointer-driven tools operating on a [`Sketch`].
//!
//! A host feeds pointer events in scene coordinates: `hover` on plain
//! motion, `pick` on press, `drag` on motion with the button held,
//! `release` on button up. `cancel` abandons the gesture in progress and
//! leaves the sketch as it was before `pick`.

use kurbo::Point;
use tracing::{debug, warn};

use super::{drag_handle, pick_handle, rebuild_handles, Handle};
use crate::error::BrushError;
use crate::nearest::nearest_point;
use crate::path::Path;
use crate::sketch::Sketch;
use crate::warp::warp;

/// Smallest warp radius the wheel can shrink to.
const MIN_WARP_RADIUS: f64 = 1.0;

pub trait Tool {
    fn hover(&mut self, _sketch: &Sketch, _pos: Point) {}
    fn pick(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError>;
    fn drag(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError>;
    fn release(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError>;
    fn cancel(&mut self, _sketch: &mut Sketch) {}
}

// ── Scribble ─────────────────────────────────────────────

/// Freehand drawing: collects a raw stroke and traces it on release.
#[derive(Debug, Default)]
pub struct ScribbleTool {
    stroke: Option<Vec<Point>>,
}

impl ScribbleTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stroke in progress, for preview.
    pub fn stroke(&self) -> Option<&[Point]> {
        self.stroke.as_deref()
    }
}

impl Tool for ScribbleTool {
    fn pick(&mut self, _sketch: &mut Sketch, pos: Point) -> Result<(), BrushError> {
        self.stroke = Some(vec![pos]);
        Ok(())
    }

    fn drag(&mut self, _sketch: &mut Sketch, pos: Point) -> Result<(), BrushError> {
        if let Some(stroke) = &mut self.stroke {
            stroke.push(pos);
        }
        Ok(())
    }

    fn release(&mut self, sketch: &mut Sketch, _pos: Point) -> Result<(), BrushError> {
        let Some(stroke) = self.stroke.take() else {
            return Ok(());
        };
        if stroke.len() <= 1 {
            debug!("discarding stroke of insufficient length");
            return Ok(());
        }
        let path = crate::trace(&stroke, sketch.config())?;
        debug!(
            raw = stroke.len(),
            elements = path.element_count(),
            "finalized stroke"
        );
        sketch.add_path(path);
        Ok(())
    }

    fn cancel(&mut self, _sketch: &mut Sketch) {
        self.stroke = None;
    }
}

// ── Handles ──────────────────────────────────────────────

#[derive(Debug)]
struct Grab {
    path: usize,
    handle: Handle,
    before: Path,
}

/// Direct manipulation of anchors and control points.
#[derive(Debug, Default)]
pub struct HandleTool {
    grab: Option<Grab>,
}

impl HandleTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path index and handle being dragged.
    pub fn grabbed(&self) -> Option<(usize, &Handle)> {
        self.grab.as_ref().map(|g| (g.path, &g.handle))
    }
}

impl Tool for HandleTool {
    fn pick(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError> {
        let radius = sketch.config().handle_pick_radius;
        let mut best: Option<(f64, Grab)> = None;
        for (i, path) in sketch.paths().iter().enumerate() {
            let handles = rebuild_handles(path);
            let Some(h) = pick_handle(&handles, pos, radius) else {
                continue;
            };
            let d = (handles[h].position - pos).hypot();
            if best.as_ref().map_or(true, |(bd, _)| d < *bd) {
                let grab = Grab {
                    path: i,
                    handle: handles[h],
                    before: path.clone(),
                };
                best = Some((d, grab));
            }
        }
        self.grab = best.map(|(_, grab)| grab);
        Ok(())
    }

    fn drag(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError> {
        let Some(grab) = &self.grab else {
            return Ok(());
        };
        let live = drag_handle(&grab.before, &grab.handle, pos)?;
        sketch.set_live(grab.path, live)
    }

    fn release(&mut self, sketch: &mut Sketch, _pos: Point) -> Result<(), BrushError> {
        let Some(grab) = self.grab.take() else {
            return Ok(());
        };
        let after = sketch
            .path(grab.path)
            .cloned()
            .unwrap_or_else(|| grab.before.clone());
        sketch.commit(grab.path, grab.before, after)
    }

    fn cancel(&mut self, sketch: &mut Sketch) {
        if let Some(grab) = self.grab.take() {
            if let Err(err) = sketch.set_live(grab.path, grab.before) {
                warn!(%err, "could not restore path after cancelled drag");
            }
        }
    }
}

// ── Warp ─────────────────────────────────────────────────

/// Phase of a warp gesture.
///
/// Committing happens inside [`Tool::release`] and returns straight to
/// `Idle`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WarpState {
    #[default]
    Idle,
    /// A path is within reach; `point` is its nearest point to the pointer.
    Targeting { path: usize, point: Point },
    /// Button held: `cloud` is the rasterized path being pushed around.
    Warping {
        path: usize,
        target: Point,
        last: Point,
        cloud: Vec<Point>,
        before: Path,
    },
}

/// Pushes the nearest path around with a radial falloff brush.
#[derive(Debug)]
pub struct WarpTool {
    state: WarpState,
    radius: f64,
}

impl WarpTool {
    pub fn new(radius: f64) -> Self {
        Self {
            state: WarpState::Idle,
            radius: radius.max(MIN_WARP_RADIUS),
        }
    }

    pub fn from_config(sketch: &Sketch) -> Self {
        Self::new(sketch.config().warp_radius)
    }

    pub fn state(&self) -> &WarpState {
        &self.state
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(MIN_WARP_RADIUS);
    }

    /// Nudge the radius by a mouse wheel delta (120 per notch).
    pub fn wheel(&mut self, delta: f64) {
        self.set_radius(self.radius + delta / 10.0);
    }

    fn retarget(&mut self, sketch: &Sketch, pos: Point) {
        self.state = sketch
            .nearest_path(pos)
            .and_then(|path| {
                let point = nearest_point(sketch.path(path)?, pos, sketch.config().search)?;
                Some(WarpState::Targeting { path, point })
            })
            .unwrap_or(WarpState::Idle);
    }
}

impl Tool for WarpTool {
    fn hover(&mut self, sketch: &Sketch, pos: Point) {
        if !matches!(self.state, WarpState::Warping { .. }) {
            self.retarget(sketch, pos);
        }
    }

    fn pick(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError> {
        self.retarget(sketch, pos);
        if let WarpState::Targeting { path, point } = self.state {
            let Some(current) = sketch.path(path) else {
                self.state = WarpState::Idle;
                return Ok(());
            };
            self.state = WarpState::Warping {
                path,
                target: point,
                last: pos,
                cloud: current.resample(),
                before: current.clone(),
            };
        }
        Ok(())
    }

    fn drag(&mut self, sketch: &mut Sketch, pos: Point) -> Result<(), BrushError> {
        let WarpState::Warping {
            path,
            target,
            last,
            cloud,
            ..
        } = &mut self.state
        else {
            return Ok(());
        };
        let config = sketch.config();
        let delta = pos - *last;
        let warped = warp(
            cloud,
            *target,
            delta,
            config.warp_strength,
            self.radius,
            config.warp_falloff,
        );
        *cloud = warped;
        *target += delta;
        *last = pos;
        let live = Path::from_points(cloud);
        sketch.set_live(*path, live)
    }

    fn release(&mut self, sketch: &mut Sketch, _pos: Point) -> Result<(), BrushError> {
        let WarpState::Warping {
            path,
            cloud,
            before,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return Ok(());
        };
        match crate::trace(&cloud, sketch.config()) {
            Ok(after) => sketch.commit(path, before, after),
            Err(err) => {
                warn!(%err, path, "warp could not be refitted, restoring path");
                sketch.set_live(path, before)?;
                Err(err)
            }
        }
    }

    fn cancel(&mut self, sketch: &mut Sketch) {
        if let WarpState::Warping { path, before, .. } = std::mem::take(&mut self.state) {
            if let Err(err) = sketch.set_live(path, before) {
                warn!(%err, "could not restore path after cancelled warp");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn scribble(tool: &mut ScribbleTool, sketch: &mut Sketch, points: &[Point]) {
        tool.pick(sketch, points[0]).unwrap();
        for &p in &points[1..] {
            tool.drag(sketch, p).unwrap();
        }
        tool.release(sketch, points[points.len() - 1]).unwrap();
    }

    #[test]
    fn single_click_is_discarded() {
        let mut sketch = Sketch::default();
        let mut tool = ScribbleTool::new();
        tool.pick(&mut sketch, Point::ZERO).unwrap();
        tool.release(&mut sketch, Point::ZERO).unwrap();
        assert!(sketch.is_empty());
        assert!(tool.stroke().is_none());
    }

    #[test]
    fn straight_stroke_stays_straight() {
        let mut sketch = Sketch::default();
        let mut tool = ScribbleTool::new();
        let points: Vec<Point> = (0..=20).map(|i| Point::new(i as f64 * 5.0, 0.0)).collect();
        scribble(&mut tool, &mut sketch, &points);
        assert_eq!(sketch.len(), 1);
        assert_eq!(sketch.path(0).unwrap().points(), vec![Point::ZERO, Point::new(100.0, 0.0)]);
    }

    #[test]
    fn handle_drag_commits_once() {
        let mut sketch = Sketch::default();
        sketch.add_path(Path::from_points(&[Point::ZERO, Point::new(100.0, 0.0)]));
        let mut tool = HandleTool::new();
        tool.pick(&mut sketch, Point::new(98.0, 1.0)).unwrap();
        assert_eq!(tool.grabbed().map(|(p, h)| (p, h.index)), Some((0, 1)));
        tool.drag(&mut sketch, Point::new(100.0, 20.0)).unwrap();
        tool.drag(&mut sketch, Point::new(100.0, 40.0)).unwrap();
        tool.release(&mut sketch, Point::new(100.0, 40.0)).unwrap();
        assert_eq!(sketch.path(0).unwrap().end_point(), Some(Point::new(100.0, 40.0)));
        assert!(sketch.undo());
        assert_eq!(sketch.path(0).unwrap().end_point(), Some(Point::new(100.0, 0.0)));
        assert!(sketch.undo());
        assert!(sketch.is_empty());
    }

    #[test]
    fn handle_pick_misses_outside_radius() {
        let mut sketch = Sketch::default();
        sketch.add_path(Path::from_points(&[Point::ZERO, Point::new(100.0, 0.0)]));
        let mut tool = HandleTool::new();
        tool.pick(&mut sketch, Point::new(50.0, 0.0)).unwrap();
        assert!(tool.grabbed().is_none());
    }

    #[test]
    fn warp_targets_nearest_path() {
        let mut sketch = Sketch::default();
        sketch.add_path(Path::from_points(&[Point::ZERO, Point::new(200.0, 0.0)]));
        let mut tool = WarpTool::from_config(&sketch);
        tool.hover(&sketch, Point::new(50.0, 30.0));
        match tool.state() {
            WarpState::Targeting { path, point } => {
                assert_eq!(*path, 0);
                assert!((point.x - 50.0).abs() < 0.1 && point.y.abs() < 1e-9);
            }
            other => panic!("unexpected state {other:?}"),
        }
        tool.hover(&sketch, Point::new(50.0, 500.0));
        assert_eq!(tool.state(), &WarpState::Idle);
    }

    #[test]
    fn warp_gesture_bends_path_and_cancel_restores() {
        let original = Path::from_points(&[Point::ZERO, Point::new(200.0, 0.0)]);
        let mut sketch = Sketch::new(EditorConfig::default());
        sketch.add_path(original.clone());
        let mut tool = WarpTool::new(60.0);

        tool.pick(&mut sketch, Point::new(100.0, 0.0)).unwrap();
        assert!(matches!(tool.state(), WarpState::Warping { .. }));
        tool.drag(&mut sketch, Point::new(100.0, 30.0)).unwrap();
        let live = sketch.path(0).unwrap();
        assert!(live.points().iter().any(|p| p.y > 20.0));
        assert_eq!(live.start_point(), Some(Point::ZERO));

        tool.cancel(&mut sketch);
        assert_eq!(sketch.path(0), Some(&original));
        assert_eq!(tool.state(), &WarpState::Idle);
    }

    #[test]
    fn warp_release_commits_fitted_path() {
        let mut sketch = Sketch::default();
        sketch.add_path(Path::from_points(&[Point::ZERO, Point::new(200.0, 0.0)]));
        let mut tool = WarpTool::new(60.0);
        tool.pick(&mut sketch, Point::new(100.0, 0.0)).unwrap();
        tool.drag(&mut sketch, Point::new(100.0, 40.0)).unwrap();
        tool.release(&mut sketch, Point::new(100.0, 40.0)).unwrap();
        let fitted = sketch.path(0).unwrap();
        assert!(!fitted.is_polyline());
        assert!(sketch.undo());
        assert_eq!(sketch.path(0).unwrap().element_count(), 2);
    }

    #[test]
    fn wheel_adjusts_radius_with_floor() {
        let mut tool = WarpTool::new(100.0);
        tool.wheel(120.0);
        assert_eq!(tool.radius(), 112.0);
        tool.wheel(-5000.0);
        assert_eq!(tool.radius(), MIN_WARP_RADIUS);
    }
}
