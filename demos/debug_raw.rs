use hsc::raw::{RawParser, Rule};
use pest::Parser;

fn main() {
    let input = std::env::args()
        .nth(1)
        .map(|path| std::fs::read_to_string(&path).expect("Failed to read file"))
        .unwrap_or_else(|| "0000m8go 0101\n0a0a".to_string());

    println!("Parsing: {:?}", input);
    println!();

    match RawParser::parse(Rule::raw, &input) {
        Ok(pairs) => {
            println!(
                "{}",
                pest_ascii_tree::into_ascii_tree(pairs.clone()).unwrap()
            );
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return;
        }
    }

    match hsc::raw::parse(&input) {
        Ok(flat) => {
            println!("{} strokes, {} points", flat.strokes.len(), flat.point_count());
            match hsc::raw::to_string(&flat) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("Error: {e}"),
            }
        }
        Err(e) => eprintln!("Error: {e}"),
    }
}
