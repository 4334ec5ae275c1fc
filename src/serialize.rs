//! Write a [`Sketch`] back out in the document grammar.
//!
//! Output is canonical rather than faithful: comments and original spacing
//! are gone, elements are separated by `,\n`, and each modifier sits on its
//! own tab-indented line.

use crate::ast::{Element, FlatStroke, MarkerElement, Point, Sketch, Stroke, StrokeElement};
use crate::defaults;
use crate::errors::SerializeError;
use crate::log::warn;
use crate::modifiers::{MarkerModifier, StrokeModifier};
use crate::numeral::BASE36;
use crate::transform::Affine;

/// Largest magnitude a modifier parameter may have. Anything bigger would
/// need more integer digits than the parser reads.
const PARAMETER_LIMIT: f64 = 1e18;

/// Serialize a whole sketch, terminated by `;`.
pub fn serialize(sketch: &Sketch) -> Result<String, SerializeError> {
    let elements = sketch
        .elements
        .iter()
        .map(serialize_element)
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|error| {
            warn!(%error, "cannot serialize sketch");
        })?;

    let mut out = elements.join(",\n");
    out.push(';');
    Ok(out)
}

/// Serialize one element, without separator or terminator.
pub fn serialize_element(element: &Element) -> Result<String, SerializeError> {
    let mut out = String::from(element.tag());
    out.push(' ');
    match element {
        Element::Brush(brush) => write_stroke_element(&mut out, brush, brush_atom)?,
        Element::Pencil(flat) | Element::Data(flat) => {
            write_stroke_element(&mut out, flat, flat_atom)?
        }
        Element::Marker(marker) => write_marker_element(&mut out, marker)?,
    }
    Ok(out)
}

fn write_stroke_element<S>(
    out: &mut String,
    element: &StrokeElement<S>,
    atom: impl Fn(&S) -> Result<String, SerializeError>,
) -> Result<(), SerializeError> {
    out.push_str("[ ");
    for stroke in &element.strokes {
        out.push_str(&atom(stroke)?);
        out.push(' ');
    }
    out.push(']');

    for modifier in &element.modifiers {
        out.push_str("\n\t");
        match modifier {
            StrokeModifier::Affine(affine) => write_affine(out, affine)?,
            StrokeModifier::Array(array) => {
                if array.count > defaults::MAX_ARRAY_COUNT {
                    return Err(SerializeError::ArrayCount { count: array.count });
                }
                out.push_str("Array [ ");
                out.push_str(&array.count.to_string());
                out.push(' ');
                write_affine(out, &array.transform)?;
                out.push_str(" ]");
            }
        }
    }
    Ok(())
}

fn write_marker_element(out: &mut String, element: &MarkerElement) -> Result<(), SerializeError> {
    let text = &element.marker.text;
    if !parens_balance(text) {
        return Err(SerializeError::UnbalancedMarker { text: text.clone() });
    }
    out.push('(');
    out.push_str(text);
    out.push(')');

    for modifier in &element.modifiers {
        out.push_str("\n\t");
        match modifier {
            MarkerModifier::Uppercase(_) => out.push_str("Uppercase [ ]"),
        }
    }
    Ok(())
}

/// Whether `(text)` lexes back as a single string literal.
fn parens_balance(text: &str) -> bool {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

fn write_affine(out: &mut String, affine: &Affine) -> Result<(), SerializeError> {
    out.push_str("Affine [ ");
    for value in affine.rows() {
        if !value.is_finite() || value.abs() >= PARAMETER_LIMIT {
            return Err(SerializeError::ParameterRange { value });
        }
        // f64 Display never switches to exponent notation.
        out.push_str(&value.to_string());
        out.push(' ');
    }
    out.push(']');
    Ok(())
}

// ============================================================================
// Atoms
// ============================================================================

fn brush_atom(stroke: &Stroke) -> Result<String, SerializeError> {
    let diameter = BASE36
        .encode_fixed(stroke.diameter, defaults::DIAMETER_WIDTH)
        .map_err(|_| SerializeError::DiameterRange {
            value: stroke.diameter,
        })?;
    let points = tick_join(&stroke.points, |p| {
        Ok(format!("{}{}", coordinate(p.x)?, coordinate(p.y)?) + &pressure(p)?)
    })?;
    Ok(format!("{diameter} {points}"))
}

fn flat_atom(stroke: &FlatStroke) -> Result<String, SerializeError> {
    tick_join(&stroke.points, |p| {
        Ok(format!("{}{}", coordinate(p.x)?, coordinate(p.y)?))
    })
}

fn tick_join<P>(
    points: &[P],
    record: impl Fn(&P) -> Result<String, SerializeError>,
) -> Result<String, SerializeError> {
    if points.is_empty() {
        return Err(SerializeError::EmptyStroke);
    }
    let records = points.iter().map(record).collect::<Result<Vec<_>, _>>()?;
    let tick = defaults::TICK.to_string();
    Ok(records.join(tick.as_str()))
}

fn coordinate(value: i32) -> Result<String, SerializeError> {
    BASE36
        .encode_fixed(value, defaults::COORD_WIDTH)
        .map_err(|_| SerializeError::CoordinateRange {
            value,
            width: defaults::COORD_WIDTH,
        })
}

/// Pressure quantized to `0..=36^2-1`. Out-of-range samples are clamped.
fn pressure(point: &Point) -> Result<String, SerializeError> {
    let sample = (point.pressure.clamp(0.0, 1.0) * defaults::PRESSURE_SCALE).round() as u32;
    BASE36
        .encode_fixed(sample, defaults::PRESSURE_WIDTH)
        .map_err(|_| SerializeError::ParameterRange {
            value: f64::from(point.pressure),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FlatPoint, Marker};
    use crate::modifiers::{Array, Uppercase};
    use crate::parse::parse;

    fn flat(points: &[(i32, i32)]) -> FlatStroke {
        FlatStroke::new(points.iter().map(|&(x, y)| FlatPoint::new(x, y)).collect())
    }

    #[test]
    fn elements_without_modifiers() {
        let sketch = Sketch::new(vec![
            Element::Pencil(StrokeElement::new(vec![flat(&[(0, 0), (1, 1)])])),
            Element::Data(StrokeElement::new(vec![])),
            Element::Marker(MarkerElement::new(Marker::new("note"))),
        ]);
        insta::assert_snapshot!(serialize(&sketch).unwrap(), @r"
        Pencil [ 000000'001001 ],
        Data [ ],
        Marker (note);
        ");
    }

    #[test]
    fn modifiers_go_on_their_own_lines() {
        let sketch = Sketch::new(vec![Element::Data(
            StrokeElement::new(vec![flat(&[(0, 0), (1296, 1296)])])
                .with_modifier(Affine::translation(10.0, 10.0))
                .with_modifier(Array::new(3, Affine::scale(0.5, -2.0))),
        )]);
        assert_eq!(
            serialize(&sketch).unwrap(),
            "Data [ 000000'100100 ]\n\tAffine [ 1 0 10 0 1 10 0 0 1 ]\n\tArray [ 3 Affine [ 0.5 0 0 0 -2 0 0 0 1 ] ];"
        );
    }

    #[test]
    fn brush_atoms() {
        let sketch = Sketch::new(vec![Element::Brush(StrokeElement::new(vec![Stroke::new(
            3,
            vec![Point::new(0, 0, 1.0), Point::new(1, -1, 0.5)],
        )]))]);
        assert_eq!(
            serialize(&sketch).unwrap(),
            "Brush [ 03 000000zz'001zzzi0 ];"
        );
    }

    #[test]
    fn marker_modifiers() {
        let sketch = Sketch::new(vec![Element::Marker(
            MarkerElement::new(Marker::new("a (b) c")).with_modifier(Uppercase),
        )]);
        assert_eq!(
            serialize(&sketch).unwrap(),
            "Marker (a (b) c)\n\tUppercase [ ];"
        );
    }

    #[test]
    fn empty_sketch_is_a_lone_terminator() {
        assert_eq!(serialize(&Sketch::default()).unwrap(), ";");
        assert_eq!(parse(";").unwrap(), Sketch::default());
    }

    #[test]
    fn unrepresentable_values_are_rejected() {
        let far = Sketch::new(vec![Element::Data(StrokeElement::new(vec![flat(&[(23328, 0)])]))]);
        assert_eq!(
            serialize(&far),
            Err(SerializeError::CoordinateRange { value: 23328, width: 3 })
        );

        let wide = Sketch::new(vec![Element::Brush(StrokeElement::new(vec![Stroke::new(
            1296,
            vec![Point::new(0, 0, 1.0)],
        )]))]);
        assert_eq!(serialize(&wide), Err(SerializeError::DiameterRange { value: 1296 }));

        let nan = Sketch::new(vec![Element::Data(
            StrokeElement::new(vec![flat(&[(0, 0)])]).with_modifier(Affine::scale(f64::NAN, 1.0)),
        )]);
        assert!(matches!(
            serialize(&nan),
            Err(SerializeError::ParameterRange { .. })
        ));

        let huge = Sketch::new(vec![Element::Data(
            StrokeElement::new(vec![flat(&[(0, 0)])]).with_modifier(Affine::translation(1e18, 0.0)),
        )]);
        assert_eq!(serialize(&huge), Err(SerializeError::ParameterRange { value: 1e18 }));

        let many = Sketch::new(vec![Element::Data(
            StrokeElement::new(vec![flat(&[(0, 0)])])
                .with_modifier(Array::new(defaults::MAX_ARRAY_COUNT + 1, Affine::IDENTITY)),
        )]);
        assert_eq!(
            serialize(&many),
            Err(SerializeError::ArrayCount {
                count: defaults::MAX_ARRAY_COUNT + 1
            })
        );

        let empty = Sketch::new(vec![Element::Pencil(StrokeElement::new(vec![FlatStroke::default()]))]);
        assert_eq!(serialize(&empty), Err(SerializeError::EmptyStroke));

        let open = Sketch::new(vec![Element::Marker(MarkerElement::new(Marker::new(")(")))]);
        assert!(matches!(
            serialize(&open),
            Err(SerializeError::UnbalancedMarker { .. })
        ));
    }

    #[test]
    fn round_trip_preserves_geometry() {
        let sketch = Sketch::new(vec![
            Element::Brush(
                StrokeElement::new(vec![
                    Stroke::new(7, vec![Point::new(-5, 9, 0.2), Point::new(300, -300, 0.9)]),
                    Stroke::new(1, vec![Point::new(0, 0, 0.0)]),
                ])
                .with_modifier(Affine::scale(0.25, 3.0))
                .with_modifier(Affine::translation(-17.5, 2.0)),
            ),
            Element::Pencil(
                StrokeElement::new(vec![flat(&[(10, 10), (20, 30)])])
                    .with_modifier(Array::new(4, Affine::translation(0.0, 100.0))),
            ),
            Element::Marker(MarkerElement::new(Marker::new("label")).with_modifier(Uppercase)),
        ]);

        let text = serialize(&sketch).unwrap();
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed.flatten(), sketch.flatten());

        let (Element::Brush(before), Element::Brush(after)) =
            (&sketch.elements[0], &reparsed.elements[0])
        else {
            panic!("expected brushes");
        };
        for (a, b) in before.strokes.iter().zip(&after.strokes) {
            assert_eq!(a.diameter, b.diameter);
            for (p, q) in a.points.iter().zip(&b.points) {
                assert!((p.pressure - q.pressure).abs() <= 1.0 / defaults::PRESSURE_SCALE);
            }
        }
    }
}
