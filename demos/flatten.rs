fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (name, input) = match std::env::args().nth(1) {
        Some(path) => {
            let input = std::fs::read_to_string(&path).expect("Failed to read file");
            (path, input)
        }
        None => (
            "<builtin>".to_string(),
            r#"% a square, repeated three times to the right
Data[ 000000'00a000'00a00a'00000a'000000 ]
    Array[ 3 Affine[ 1 0 20 0 1 0 0 0 1 ] ],
Marker (squares) Uppercase[ ];"#
                .to_string(),
        ),
    };

    let sketch = match hsc::parse(&input) {
        Ok(sketch) => sketch,
        Err(e) => {
            eprintln!("{:?}", hsc::SourceContext::new(name, input).report(e));
            std::process::exit(1);
        }
    };

    let flat = sketch.flatten();
    println!(
        "{} elements -> {} strokes, {} points",
        sketch.elements.len(),
        flat.strokes.len(),
        flat.point_count()
    );
    for (i, stroke) in flat.strokes.iter().enumerate() {
        let points: Vec<String> = stroke
            .points
            .iter()
            .map(|p| format!("({}, {})", p.x, p.y))
            .collect();
        println!("stroke {i}: {}", points.join(" "));
    }
    for marker in &flat.markers {
        println!("marker: {}", marker.text);
    }

    println!();
    match hsc::serialize(&sketch) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
