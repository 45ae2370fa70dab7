//! End-to-end editing sessions: draw, bend, drag handles, refit, save and
//! reload.

use vectorbrush::edit::{HandleTool, ScribbleTool, Tool, WarpState, WarpTool};
use vectorbrush::kurbo::Point;
use vectorbrush::persist::{PointList, SketchFile};
use vectorbrush::{trace, EditorConfig, HandleRole, Sketch};

/// Half a sine wave, sampled like a pointer trail.
fn wave_stroke() -> Vec<Point> {
    (0..=120)
        .map(|i| {
            let x = i as f64 * 2.5;
            Point::new(x, 80.0 * (x / 300.0 * std::f64::consts::PI).sin())
        })
        .collect()
}

fn draw(sketch: &mut Sketch, stroke: &[Point]) {
    let mut tool = ScribbleTool::new();
    tool.pick(sketch, stroke[0]).unwrap();
    for &p in &stroke[1..] {
        tool.drag(sketch, p).unwrap();
    }
    tool.release(sketch, stroke[stroke.len() - 1]).unwrap();
}

// ─── Scribble ────────────────────────────────────────────────────────────────

#[test]
fn scribble_produces_fitted_curve() {
    let mut sketch = Sketch::default();
    draw(&mut sketch, &wave_stroke());
    assert_eq!(sketch.len(), 1);
    let path = sketch.path(0).unwrap();
    let (curves, lines) = path.segment_counts();
    assert!(curves >= 1);
    assert_eq!(lines, 0);
    assert!(path.length() > 300.0);
}

#[test]
fn scribble_matches_trace_pipeline() {
    let stroke = wave_stroke();
    let mut sketch = Sketch::default();
    draw(&mut sketch, &stroke);
    let expected = trace(&stroke, &EditorConfig::default()).unwrap();
    assert_eq!(sketch.path(0), Some(&expected));
}

// ─── Handles ─────────────────────────────────────────────────────────────────

#[test]
fn dragging_an_interior_control_keeps_join_tangent() {
    let mut sketch = Sketch::default();
    draw(&mut sketch, &wave_stroke());
    let handles = sketch.handles(0).unwrap();
    let control = handles
        .iter()
        .find(|h| matches!(h.role, HandleRole::Control { partner: Some(_), .. }))
        .copied()
        .expect("wave fit should have an interior join");
    let HandleRole::Control {
        anchor,
        partner: Some(partner),
    } = control.role
    else {
        panic!("expected a mirrored control, got {:?}", control.role);
    };

    let mut tool = HandleTool::new();
    tool.pick(&mut sketch, control.position).unwrap();
    let to = control.position + vectorbrush::kurbo::Vec2::new(15.0, -25.0);
    tool.drag(&mut sketch, to).unwrap();
    tool.release(&mut sketch, to).unwrap();

    let path = sketch.path(0).unwrap();
    let a = path.point_at(anchor).unwrap();
    let arm = path.point_at(control.index).unwrap() - a;
    let opposite = path.point_at(partner).unwrap() - a;
    let cross = arm.x * opposite.y - arm.y * opposite.x;
    assert!(cross.abs() < 1e-6 * arm.hypot() * opposite.hypot());
    assert!(arm.dot(opposite) < 0.0);

    assert!(sketch.undo());
    assert_eq!(sketch.path(0).unwrap().point_at(control.index), Some(control.position));
}

// ─── Warp ────────────────────────────────────────────────────────────────────

#[test]
fn warp_bends_only_near_the_brush() {
    let mut sketch = Sketch::default();
    draw(&mut sketch, &wave_stroke());
    let before = sketch.path(0).unwrap().clone();

    let mut tool = WarpTool::new(50.0);
    let grab = before.sample(0.5);
    tool.hover(&sketch, grab + vectorbrush::kurbo::Vec2::new(0.0, 5.0));
    assert!(matches!(tool.state(), WarpState::Targeting { path: 0, .. }));

    tool.pick(&mut sketch, grab).unwrap();
    for step in 1..=10 {
        let pos = grab + vectorbrush::kurbo::Vec2::new(0.0, 4.0 * step as f64);
        tool.drag(&mut sketch, pos).unwrap();
    }
    tool.release(&mut sketch, grab).unwrap();
    assert_eq!(tool.state(), &WarpState::Idle);

    let after = sketch.path(0).unwrap();
    assert_ne!(after, &before);
    let start_shift = after.start_point().unwrap().distance(before.start_point().unwrap());
    assert!(start_shift < 5.0, "start moved by {start_shift}");

    assert!(sketch.undo());
    assert_eq!(sketch.path(0), Some(&before));
}

#[test]
fn warp_far_from_any_path_does_nothing() {
    let mut sketch = Sketch::default();
    draw(&mut sketch, &wave_stroke());
    let before = sketch.paths().to_vec();
    let mut tool = WarpTool::from_config(&sketch);
    let far = Point::new(150.0, 1000.0);
    tool.pick(&mut sketch, far).unwrap();
    tool.drag(&mut sketch, far + vectorbrush::kurbo::Vec2::new(30.0, 0.0)).unwrap();
    tool.release(&mut sketch, far).unwrap();
    assert_eq!(sketch.paths(), &before[..]);
}

// ─── Refit & persistence ─────────────────────────────────────────────────────

#[test]
fn refit_all_with_looser_smoothing() {
    let mut sketch = Sketch::default();
    draw(&mut sketch, &wave_stroke());
    let before = sketch.path(0).unwrap().element_count();
    sketch.config_mut().simplify_tolerance = 30.0;
    sketch.config_mut().smoothing = 50.0;
    sketch.refit_all().unwrap();
    assert!(sketch.path(0).unwrap().element_count() <= before);
}

#[test]
fn sketch_survives_save_and_reload() {
    let mut sketch = Sketch::default();
    draw(&mut sketch, &wave_stroke());
    draw(
        &mut sketch,
        &[Point::new(0.0, 200.0), Point::new(150.0, 200.0), Point::new(300.0, 200.0)],
    );
    assert_eq!(sketch.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("sketch.json");
    SketchFile::from_paths(sketch.paths()).save(&file).unwrap();

    let loaded = SketchFile::load(&file).unwrap();
    assert_eq!(loaded.paths.len(), 2);
    let strokes = loaded.strokes().unwrap();
    let reloaded: Vec<_> = strokes
        .iter()
        .map(|s| trace(s, sketch.config()).unwrap())
        .collect();
    assert_eq!(reloaded[1].points(), vec![Point::new(0.0, 200.0), Point::new(300.0, 200.0)]);
    let original_len = sketch.path(0).unwrap().length();
    assert!((reloaded[0].length() - original_len).abs() < original_len * 0.05);
}

#[test]
fn malformed_point_list_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.json");
    std::fs::write(&file, r#"{"paths": [{"x": [1, 2, 3], "y": [1, 2]}]}"#).unwrap();
    let loaded = SketchFile::load(&file).unwrap();
    assert!(loaded.strokes().is_err());
    assert_eq!(loaded.paths[0], PointList { x: vec![1.0, 2.0, 3.0], y: vec![1.0, 2.0] });
}
