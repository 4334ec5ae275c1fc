//! Document tree types for sketch documents
//!
//! A [`Sketch`] is what the parser builds and the serializer writes. A
//! [`FlatSketch`] is what a renderer consumes once every modifier has been
//! applied.

use crate::defaults;
use crate::modifiers::{MarkerModifier, StrokeModifier};

/// A pen sample with pressure in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub pressure: f32,
}

impl Point {
    pub fn new(x: i32, y: i32, pressure: f32) -> Self {
        Self { x, y, pressure }
    }
}

/// A point with implicit full pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlatPoint {
    pub x: i32,
    pub y: i32,
}

impl FlatPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<FlatPoint> for Point {
    fn from(p: FlatPoint) -> Self {
        Point::new(p.x, p.y, 1.0)
    }
}

impl From<Point> for FlatPoint {
    fn from(p: Point) -> Self {
        FlatPoint::new(p.x, p.y)
    }
}

/// A freehand stroke. Fewer than two points render as a single dab.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub diameter: u32,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(diameter: u32, points: Vec<Point>) -> Self {
        Self { diameter, points }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new(defaults::FLAT_DIAMETER, Vec::new())
    }
}

impl From<&FlatStroke> for Stroke {
    fn from(s: &FlatStroke) -> Self {
        Stroke::new(
            FlatStroke::DIAMETER,
            s.points.iter().copied().map(Point::from).collect(),
        )
    }
}

/// A stroke without diameter or pressure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FlatStroke {
    pub points: Vec<FlatPoint>,
}

impl FlatStroke {
    /// Diameter a renderer should draw flat strokes with.
    pub const DIAMETER: u32 = defaults::FLAT_DIAMETER;

    pub fn new(points: Vec<FlatPoint>) -> Self {
        Self { points }
    }
}

impl From<&Stroke> for FlatStroke {
    fn from(s: &Stroke) -> Self {
        FlatStroke::new(s.points.iter().copied().map(FlatPoint::from).collect())
    }
}

/// A free-text annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Marker {
    pub text: String,
}

impl Marker {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Strokes plus the modifiers applied to them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeElement<S> {
    pub strokes: Vec<S>,
    pub modifiers: Vec<StrokeModifier>,
}

impl<S> StrokeElement<S> {
    pub fn new(strokes: Vec<S>) -> Self {
        Self {
            strokes,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<StrokeModifier>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }
}

/// A single marker plus its modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerElement {
    pub marker: Marker,
    pub modifiers: Vec<MarkerModifier>,
}

impl MarkerElement {
    pub fn new(marker: Marker) -> Self {
        Self {
            marker,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<MarkerModifier>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }
}

/// One unit of document content.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Pressure-sensitive strokes with a diameter each
    Brush(StrokeElement<Stroke>),
    /// Thin hand-drawn strokes
    Pencil(StrokeElement<FlatStroke>),
    /// Generated or imported geometry
    Data(StrokeElement<FlatStroke>),
    Marker(MarkerElement),
}

impl Element {
    /// The keyword this element is written with.
    pub fn tag(&self) -> &'static str {
        match self {
            Element::Brush(_) => "Brush",
            Element::Pencil(_) => "Pencil",
            Element::Data(_) => "Data",
            Element::Marker(_) => "Marker",
        }
    }
}

/// A parsed document: elements in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sketch {
    pub elements: Vec<Element>,
}

impl Sketch {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    /// Wrap flat geometry as a single `Data` element.
    ///
    /// Markers, if any, follow as unmodified `Marker` elements.
    pub fn from_raw(flat: FlatSketch) -> Self {
        let mut elements = vec![Element::Data(StrokeElement::new(flat.strokes))];
        elements.extend(
            flat.markers
                .into_iter()
                .map(|m| Element::Marker(MarkerElement::new(m))),
        );
        Self { elements }
    }

    /// Append a finished pen stroke.
    ///
    /// Joins the trailing `Brush` element when it has no modifiers, so new
    /// ink is never transformed by modifiers written for older strokes.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        if let Some(Element::Brush(brush)) = self.elements.last_mut() {
            if brush.modifiers.is_empty() {
                brush.strokes.push(stroke);
                return;
            }
        }
        self.elements
            .push(Element::Brush(StrokeElement::new(vec![stroke])));
    }
}

/// Modifier-free geometry ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatSketch {
    pub strokes: Vec<FlatStroke>,
    /// Resolved marker text, in document order. Never drawn as strokes.
    pub markers: Vec<Marker>,
}

impl FlatSketch {
    pub fn new(strokes: Vec<FlatStroke>) -> Self {
        Self {
            strokes,
            markers: Vec::new(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Affine;

    #[test]
    fn promotion_sets_full_pressure() {
        let p = Point::from(FlatPoint::new(4, -2));
        assert_eq!(p, Point::new(4, -2, 1.0));
        assert_eq!(FlatPoint::from(Point::new(7, 8, 0.25)), FlatPoint::new(7, 8));
    }

    #[test]
    fn flat_strokes_promote_with_the_default_diameter() {
        let flat = FlatStroke::new(vec![FlatPoint::new(1, 2)]);
        let stroke = Stroke::from(&flat);
        assert_eq!(stroke.diameter, 3);
        assert_eq!(FlatStroke::from(&stroke), flat);
    }

    #[test]
    fn pen_strokes_join_the_trailing_brush() {
        let mut sketch = Sketch::default();
        sketch.push_stroke(Stroke::new(5, vec![Point::new(0, 0, 0.5)]));
        sketch.push_stroke(Stroke::new(5, vec![Point::new(1, 1, 0.5)]));
        assert_eq!(sketch.elements.len(), 1);

        let Element::Brush(brush) = &mut sketch.elements[0] else {
            panic!("expected a brush");
        };
        brush.modifiers.push(Affine::translation(1.0, 1.0).into());

        sketch.push_stroke(Stroke::new(5, vec![Point::new(2, 2, 0.5)]));
        assert_eq!(sketch.elements.len(), 2);
    }

    #[test]
    fn raw_geometry_becomes_one_data_element() {
        let flat = FlatSketch::new(vec![FlatStroke::new(vec![FlatPoint::new(0, 0)])]);
        let sketch = Sketch::from_raw(flat.clone());
        assert_eq!(sketch.elements.len(), 1);
        assert_eq!(
            sketch.elements[0],
            Element::Data(StrokeElement::new(flat.strokes))
        );
    }
}
