//! Piecewise curve model: an owned sequence of MoveTo / LineTo / CubicTo
//! segments, plus the flat element view that handles and index-based edits
//! address.
//!
//! In the flat view MoveTo and LineTo are one element each and a CubicTo is
//! three: its first control point (`CurveTo`), its second control point and
//! its end point (both `CurveData`).

mod sample;

pub use sample::Sampler;

use std::ops::Range;

use kurbo::{BezPath, Point};

use crate::error::BrushError;

/// One step of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    /// Two control points, then the on-curve end point.
    CubicTo(Point, Point, Point),
}

impl Segment {
    /// The on-curve point this segment ends at.
    pub fn end(&self) -> Point {
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) | Segment::CubicTo(_, _, p) => p,
        }
    }

    /// Number of flat elements this segment occupies.
    pub fn element_count(&self) -> usize {
        match self {
            Segment::CubicTo(..) => 3,
            _ => 1,
        }
    }
}

/// Kind of a flat path element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    MoveTo,
    LineTo,
    /// First control point of a cubic.
    CurveTo,
    /// Second control point or end point of a cubic.
    CurveData,
}

/// A single flat element: kind plus coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathElement {
    pub kind: ElementKind,
    pub point: Point,
}

impl PathElement {
    pub fn new(kind: ElementKind, point: Point) -> Self {
        Self { kind, point }
    }
}

/// Position of a flat element inside its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Single,
    Control1,
    Control2,
    End,
}

/// An ordered sequence of segments. The first segment is always a MoveTo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// MoveTo the first point, then LineTo each remaining one.
    ///
    /// An empty slice gives an empty path and a single point a lone MoveTo.
    pub fn from_points(points: &[Point]) -> Self {
        let mut path = Path::new();
        if let Some((&first, rest)) = points.split_first() {
            path.move_to(first);
            for &p in rest {
                path.line_to(p);
            }
        }
        path
    }

    /// Rebuild a path from its flat element view.
    ///
    /// Every `CurveTo` must be followed by exactly two `CurveData` elements,
    /// and the sequence must open with a `MoveTo`.
    pub fn from_elements(elements: &[PathElement]) -> Result<Self, BrushError> {
        let mut path = Path::new();
        if let Some(first) = elements.first() {
            if first.kind != ElementKind::MoveTo {
                return Err(BrushError::MalformedSequence(
                    "path must start with MoveTo".into(),
                ));
            }
        }

        let mut i = 0;
        while i < elements.len() {
            let el = elements[i];
            match el.kind {
                ElementKind::MoveTo => path.move_to(el.point),
                ElementKind::LineTo => path.line_to(el.point),
                ElementKind::CurveTo => {
                    let c2 = elements.get(i + 1);
                    let end = elements.get(i + 2);
                    match (c2, end) {
                        (Some(c2), Some(end))
                            if c2.kind == ElementKind::CurveData
                                && end.kind == ElementKind::CurveData =>
                        {
                            path.curve_to(el.point, c2.point, end.point);
                            i += 3;
                            continue;
                        }
                        _ => {
                            return Err(BrushError::MalformedSequence(format!(
                                "CurveTo at element {i} is not followed by two CurveData elements"
                            )))
                        }
                    }
                }
                ElementKind::CurveData => {
                    return Err(BrushError::MalformedSequence(format!(
                        "CurveData at element {i} is not in CurveTo order"
                    )))
                }
            }
            i += 1;
        }
        Ok(path)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of flat elements.
    pub fn element_count(&self) -> usize {
        self.segments.iter().map(Segment::element_count).sum()
    }

    /// The flat element view.
    pub fn elements(&self) -> Vec<PathElement> {
        let mut elements = Vec::with_capacity(self.element_count());
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => elements.push(PathElement::new(ElementKind::MoveTo, p)),
                Segment::LineTo(p) => elements.push(PathElement::new(ElementKind::LineTo, p)),
                Segment::CubicTo(c1, c2, p) => {
                    elements.push(PathElement::new(ElementKind::CurveTo, c1));
                    elements.push(PathElement::new(ElementKind::CurveData, c2));
                    elements.push(PathElement::new(ElementKind::CurveData, p));
                }
            }
        }
        elements
    }

    /// Every element coordinate in order, control points included.
    pub fn points(&self) -> Vec<Point> {
        self.elements().into_iter().map(|el| el.point).collect()
    }

    pub fn point_at(&self, index: usize) -> Option<Point> {
        let (seg, slot) = self.locate(index)?;
        Some(slot_point(&self.segments[seg], slot))
    }

    /// True when the element is an off-curve control point.
    pub fn is_control_point(&self, index: usize) -> bool {
        matches!(
            self.locate(index),
            Some((_, Slot::Control1 | Slot::Control2))
        )
    }

    pub fn start_point(&self) -> Option<Point> {
        self.segments.first().map(Segment::end)
    }

    pub fn end_point(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }

    /// True when the path has no cubic segments.
    pub fn is_polyline(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|seg| matches!(seg, Segment::CubicTo(..)))
    }

    /// Count (curves, lines) segments.
    pub fn segment_counts(&self) -> (usize, usize) {
        let mut curves = 0;
        let mut lines = 0;
        for seg in &self.segments {
            match seg {
                Segment::CubicTo(..) => curves += 1,
                Segment::LineTo(_) => lines += 1,
                Segment::MoveTo(_) => {}
            }
        }
        (curves, lines)
    }

    /// Overwrite the coordinate of one flat element.
    pub fn set_position_at(&mut self, index: usize, point: Point) -> Result<(), BrushError> {
        let invalid = BrushError::InvalidRange {
            start: index,
            end: index.saturating_add(1),
            len: self.element_count(),
        };
        let Some((seg, slot)) = self.locate(index) else {
            return Err(invalid);
        };
        match (&mut self.segments[seg], slot) {
            (Segment::MoveTo(p) | Segment::LineTo(p), Slot::Single) => *p = point,
            (Segment::CubicTo(c1, _, _), Slot::Control1) => *c1 = point,
            (Segment::CubicTo(_, c2, _), Slot::Control2) => *c2 = point,
            (Segment::CubicTo(_, _, p), Slot::End) => *p = point,
            _ => return Err(invalid),
        }
        Ok(())
    }

    /// Copy the flat element range `range` into a new path.
    ///
    /// The first copied element becomes a MoveTo. The range may not start
    /// on a control point nor end part-way through a cubic.
    pub fn slice(&self, range: Range<usize>) -> Result<Path, BrushError> {
        let len = self.element_count();
        let invalid = BrushError::InvalidRange {
            start: range.start,
            end: range.end,
            len,
        };
        if range.start >= range.end || range.end > len {
            return Err(invalid);
        }
        if self.is_control_point(range.start) || self.is_control_point(range.end - 1) {
            return Err(invalid);
        }

        let elements = self.elements();
        let mut picked: Vec<PathElement> = elements[range].to_vec();
        picked[0].kind = ElementKind::MoveTo;
        Path::from_elements(&picked)
    }

    /// Append `other` to this path.
    ///
    /// A leading MoveTo of `other` that lands exactly on the current end
    /// point is dropped so the two join into one subpath; any other MoveTo
    /// starts a new subpath.
    pub fn append(&mut self, other: &Path) {
        let mut incoming = other.segments.iter().peekable();
        if let (Some(end), Some(Segment::MoveTo(p))) = (self.end_point(), incoming.peek()) {
            if *p == end {
                incoming.next();
            }
        }
        self.segments.extend(incoming.copied());
    }

    /// Convert to a kurbo path for rendering and measurement.
    pub fn to_bezpath(&self) -> BezPath {
        let mut bez = BezPath::new();
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => bez.move_to(p),
                Segment::LineTo(p) => bez.line_to(p),
                Segment::CubicTo(c1, c2, p) => bez.curve_to(c1, c2, p),
            }
        }
        bez
    }

    pub(crate) fn move_to(&mut self, p: Point) {
        self.segments.push(Segment::MoveTo(p));
    }

    /// Falls back to a MoveTo on an empty path so the first segment is
    /// always a MoveTo.
    pub(crate) fn line_to(&mut self, p: Point) {
        if self.segments.is_empty() {
            self.move_to(p);
        } else {
            self.segments.push(Segment::LineTo(p));
        }
    }

    pub(crate) fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        debug_assert!(!self.segments.is_empty(), "CubicTo needs a current point");
        self.segments.push(Segment::CubicTo(c1, c2, p));
    }

    /// Map a flat element index to (segment index, slot).
    fn locate(&self, index: usize) -> Option<(usize, Slot)> {
        let mut base = 0;
        for (i, seg) in self.segments.iter().enumerate() {
            let count = seg.element_count();
            if index < base + count {
                let slot = match (seg, index - base) {
                    (Segment::CubicTo(..), 0) => Slot::Control1,
                    (Segment::CubicTo(..), 1) => Slot::Control2,
                    (Segment::CubicTo(..), _) => Slot::End,
                    _ => Slot::Single,
                };
                return Some((i, slot));
            }
            base += count;
        }
        None
    }
}

fn slot_point(seg: &Segment, slot: Slot) -> Point {
    match (*seg, slot) {
        (Segment::CubicTo(c1, _, _), Slot::Control1) => c1,
        (Segment::CubicTo(_, c2, _), Slot::Control2) => c2,
        (seg, _) => seg.end(),
    }
}
