use hsc::{Element, ErrorKind, FlatPoint, FlatStroke, Point, Sketch, SourcePos, Stroke};

#[test]
fn translated_data_moves_both_points() {
    let sketch = hsc::parse("Data[ 000000100100 ] Affine[ 1 0 10 0 1 10 0 0 1 ];").unwrap();
    assert_eq!(sketch.elements.len(), 1);
    assert!(matches!(sketch.elements[0], Element::Data(_)));

    let flat = sketch.flatten();
    assert_eq!(
        flat.strokes,
        vec![FlatStroke::new(vec![
            FlatPoint::new(10, 10),
            FlatPoint::new(1306, 1306),
        ])]
    );
}

#[test]
fn raw_format_decodes_base36_pairs() {
    let flat = hsc::raw::parse("0000m8go").unwrap();
    assert_eq!(
        flat.strokes,
        vec![FlatStroke::new(vec![FlatPoint::new(0, 0), FlatPoint::new(800, 600)])]
    );

    let sketch = Sketch::from_raw(flat);
    let text = hsc::serialize(&sketch).unwrap();
    assert_eq!(text, "Data [ 000000'0m80go ];");
    assert_eq!(hsc::parse(&text).unwrap(), sketch);
}

#[test]
fn pen_input_round_trips_through_text() {
    let mut sketch = hsc::parse("Marker (page 1);").unwrap();
    sketch.push_stroke(Stroke::new(4, vec![Point::new(10, 20, 1.0), Point::new(30, 40, 0.0)]));
    sketch.push_stroke(Stroke::new(4, vec![Point::new(-7, -7, 1.0)]));
    assert_eq!(sketch.elements.len(), 2);

    let text = hsc::serialize(&sketch).unwrap();
    assert_eq!(
        text,
        "Marker (page 1),\nBrush [ 04 00a00kzz'00u01400 04 zztzztzz ];"
    );
    assert_eq!(hsc::parse(&text).unwrap(), sketch);
}

#[test]
fn errors_render_with_source_context() {
    let source = "Data[ 000000 ]\n  Affine[ 1 0 0 ];";
    let err = hsc::parse(source).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ModAffineSize);
    assert_eq!(err.pos, SourcePos::new(2, 3));

    let report = hsc::SourceContext::new("square.hsc", source).report(err);
    let rendered = format!("{report:?}");
    assert!(rendered.contains("Affine takes exactly 9 numbers"), "{rendered}");
    assert!(rendered.contains("square.hsc"), "{rendered}");
}

#[test]
fn lexing_stops_at_the_first_terminator() {
    let sketch = hsc::parse("Data[ ]; Circle ( never closed").unwrap();
    assert_eq!(sketch.elements.len(), 1);
}
