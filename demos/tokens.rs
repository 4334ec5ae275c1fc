fn main() {
    let input = std::env::args()
        .nth(1)
        .map(|path| std::fs::read_to_string(&path).expect("Failed to read file"))
        .unwrap_or_else(|| "Marker (a (nested) note) Uppercase[ ],\nData[ 000000'00a00a ];".to_string());

    println!("{}", hsc::lexer::dump_tokens(&input));
}
