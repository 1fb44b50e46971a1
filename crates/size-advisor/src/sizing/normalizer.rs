/// Lowercase, strip invisible characters, and join words with `-` so that
/// `"Soccer "`, `"soccer"` and `"SOCCER"` resolve to the same chart.
pub(crate) fn normalize_slug(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_ascii_lowercase()
}
