/// Split a line into lowercase terms.
///
/// Terms are maximal runs of alphanumeric characters; everything else is a
/// separator. Empty terms are never produced.
pub fn extract_terms(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(lowercase_term)
}

/// Split a content search phrase into the lowercase words it requires.
///
/// Words are separated by spaces only; a query word is looked up as typed,
/// so punctuation inside a word is kept.
pub fn split_phrase(phrase: &str) -> Vec<String> {
    phrase
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(lowercase_term)
        .collect()
}

fn lowercase_term(term: &str) -> String {
    if term.is_ascii() {
        term.to_ascii_lowercase()
    } else {
        term.to_lowercase()
    }
}
