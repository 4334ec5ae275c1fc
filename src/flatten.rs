//! Resolve every modifier of a [`Sketch`] into plain geometry.

use crate::ast::{Element, FlatSketch, FlatStroke, Sketch, Stroke, StrokeElement};
use crate::log::debug;
use crate::modifiers::{apply_marker_modifiers, apply_stroke_modifiers};

impl Sketch {
    /// Apply each element's modifiers and collect the results in order.
    ///
    /// Strokes of every kind come out flat. Markers never become strokes;
    /// they land in [`FlatSketch::markers`] after their own modifiers ran.
    pub fn flatten(&self) -> FlatSketch {
        let mut flat = FlatSketch::default();

        for element in &self.elements {
            match element {
                Element::Brush(brush) => {
                    let strokes = apply_stroke_modifiers(&brush.modifiers, &brush.strokes);
                    debug!(tag = element.tag(), strokes = strokes.len(), "flattened element");
                    flat.strokes.extend(strokes.iter().map(FlatStroke::from));
                }
                Element::Pencil(inner) | Element::Data(inner) => {
                    let strokes = flatten_flat(inner);
                    debug!(tag = element.tag(), strokes = strokes.len(), "flattened element");
                    flat.strokes.extend(strokes);
                }
                Element::Marker(marker) => {
                    let markers =
                        apply_marker_modifiers(&marker.modifiers, std::slice::from_ref(&marker.marker));
                    debug!(tag = element.tag(), markers = markers.len(), "flattened element");
                    flat.markers.extend(markers);
                }
            }
        }

        flat
    }
}

fn flatten_flat(element: &StrokeElement<FlatStroke>) -> Vec<FlatStroke> {
    if element.modifiers.is_empty() {
        return element.strokes.clone();
    }
    let promoted: Vec<Stroke> = element.strokes.iter().map(Stroke::from).collect();
    apply_stroke_modifiers(&element.modifiers, &promoted)
        .iter()
        .map(FlatStroke::from)
        .collect()
}
