//! Filename keyword heuristic used for placeholder labels.

/// Keywords per class id, checked in order. The first class with a
/// matching keyword wins, so `bottle` resolves to plastic.
pub const KEYWORD_TABLE: [(usize, &[&str]); 5] = [
    (0, &["plastic", "bottle", "pet"]),
    (1, &["paper", "cardboard", "cup"]),
    (2, &["metal", "aluminum", "can", "tin"]),
    (3, &["glass", "bottle", "jar"]),
    (4, &["organic", "food", "waste"]),
];

/// Guess a class id from free text, usually an image file name.
///
/// Matching is a case-insensitive substring search.
pub fn guess_class(text: &str) -> Option<usize> {
    let lowered = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(class_id, _)| *class_id)
}
