/// Capitalize a label for display: first character uppercased, the rest
/// lowercased. Matches how the upstream data tooling renders neighbourhood
/// names ("JARDIM CAMBURI" → "Jardim camburi").
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
