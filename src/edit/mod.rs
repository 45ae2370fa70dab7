//! Handle-based editing of fitted paths.
//!
//! Every flat element gets a handle. On-curve points are anchors; dragging
//! an interior anchor carries its neighbouring control points along.
//! Off-curve points are controls; dragging one mirrors its partner across
//! the shared anchor so the join stays tangent-continuous.

mod session;

pub use session::{HandleTool, ScribbleTool, Tool, WarpState, WarpTool};

use std::f64::consts::PI;

use kurbo::{Point, Vec2};

use crate::error::BrushError;
use crate::geom::{angle_from, distance};
use crate::path::{ElementKind, Path};

/// What a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRole {
    /// An on-curve point.
    Anchor,
    /// An off-curve point attached to the on-curve point `anchor`. `partner`
    /// is the control point on the other side of that anchor, if there is one.
    Control {
        anchor: usize,
        partner: Option<usize>,
    },
}

/// A draggable point bound to one flat element of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub index: usize,
    pub position: Point,
    pub role: HandleRole,
}

/// One handle per flat element of `path`.
pub fn rebuild_handles(path: &Path) -> Vec<Handle> {
    path.elements()
        .iter()
        .enumerate()
        .map(|(index, el)| Handle {
            index,
            position: el.point,
            role: role_of(path, index, el.kind),
        })
        .collect()
}

fn role_of(path: &Path, index: usize, kind: ElementKind) -> HandleRole {
    if !path.is_control_point(index) {
        return HandleRole::Anchor;
    }
    if kind == ElementKind::CurveTo {
        // c1: anchored to the previous on-curve point.
        let partner = index
            .checked_sub(2)
            .filter(|&i| path.is_control_point(i));
        HandleRole::Control {
            anchor: index - 1,
            partner,
        }
    } else {
        // c2: anchored to the segment's end point.
        let partner = Some(index + 2).filter(|&i| path.is_control_point(i));
        HandleRole::Control {
            anchor: index + 1,
            partner,
        }
    }
}

/// Index of the handle nearest to `pos`, if any lies within `radius`.
pub fn pick_handle(handles: &[Handle], pos: Point, radius: f64) -> Option<usize> {
    handles
        .iter()
        .enumerate()
        .map(|(i, h)| (i, distance(h.position, pos)))
        .filter(|&(_, d)| d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Move `handle` to `to` and return the edited path.
///
/// The handle's role is re-derived from `path`, so a handle from an older
/// rebuild is still applied consistently as long as its index exists.
pub fn drag_handle(path: &Path, handle: &Handle, to: Point) -> Result<Path, BrushError> {
    let index = handle.index;
    let len = path.element_count();
    let from = path.point_at(index).ok_or(BrushError::InvalidRange {
        start: index,
        end: index.saturating_add(1),
        len,
    })?;
    let is_interior = |i: usize| i > 0 && i + 1 < len;

    let mut edited = path.clone();
    edited.set_position_at(index, to)?;

    let kind = path.elements()[index].kind;
    match role_of(path, index, kind) {
        HandleRole::Anchor => {
            if is_interior(index) {
                let delta = to - from;
                for neighbour in [index - 1, index + 1] {
                    if !path.is_control_point(neighbour) {
                        continue;
                    }
                    if let Some(p) = path.point_at(neighbour) {
                        edited.set_position_at(neighbour, p + delta)?;
                    }
                }
            }
        }
        HandleRole::Control { anchor, partner } => {
            if let (true, Some(partner)) = (is_interior(anchor), partner) {
                if let (Some(a), Some(q)) = (path.point_at(anchor), path.point_at(partner)) {
                    edited.set_position_at(partner, mirrored(a, q, to))?;
                }
            }
        }
    }
    Ok(edited)
}

/// Place `partner` opposite `dragged` across `anchor`, keeping its distance.
fn mirrored(anchor: Point, partner: Point, dragged: Point) -> Point {
    let reach = distance(anchor, partner);
    let angle = angle_from(anchor, dragged) + PI;
    anchor + Vec2::from_angle(angle) * reach
}
