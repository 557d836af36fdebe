/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut row = vec![0; a.len() + 1];
    for (j, cb) in b.iter().enumerate() {
        row[0] = j + 1;
        for (i, ca) in a.iter().enumerate() {
            let substitution = prev[i] + usize::from(ca != cb);
            row[i + 1] = substitution.min(prev[i + 1] + 1).min(row[i] + 1);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[a.len()]
}

/// Closest of `names` (already lowercase) to `term`, if it is close enough to
/// be worth suggesting: within `max(1, 0.4 × len)` edits and not the term
/// itself.  Ties keep the earliest name.
pub fn best_suggestion<'a, I>(term: &str, names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized = term.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<(&str, usize)> = None;
    for name in names {
        let distance = levenshtein(&normalized, name);
        if best.map(|(_, d)| distance < d).unwrap_or(true) {
            best = Some((name, distance));
        }
    }

    let (name, distance) = best?;
    let threshold = (normalized.chars().count() as f64 * 0.4).max(1.0);
    if distance as f64 <= threshold && name != normalized {
        Some(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("goblin", "goblin"), 0);
        assert_eq!(levenshtein("gobin", "goblin"), 1);
        assert_eq!(levenshtein("dräko", "drako"), 1);
    }

    #[test]
    fn test_suggestion_threshold() {
        let names = ["goblin", "hobgoblin", "owlbear"];
        assert_eq!(best_suggestion("gobiln", names), Some("goblin"));
        assert_eq!(best_suggestion("OWLBAER", names), Some("owlbear"));
        // Too far from everything.
        assert_eq!(best_suggestion("tarrasque", names), None);
        // Exact match is not a suggestion.
        assert_eq!(best_suggestion("goblin", names), None);
        assert_eq!(best_suggestion("", names), None);
    }

    #[test]
    fn test_short_terms_allow_one_edit() {
        let names = ["imp", "orc"];
        assert_eq!(best_suggestion("ork", names), Some("orc"));
        assert_eq!(best_suggestion("xy", names), None);
    }
}
