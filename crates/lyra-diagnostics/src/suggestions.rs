// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Did-you-mean hints for misspelled names.

use lyra_interp::method_names;

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_ch) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find the best match for `name` among `candidates`.
///
/// Returns `Some("did you mean `closest`?")` if a close match is found.
pub fn did_you_mean<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max_distance = match name.chars().count() {
        0..=2 => 1,
        3..=5 => 2,
        _ => 3,
    };

    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        if name.len().abs_diff(candidate.len()) > max_distance {
            continue;
        }
        let dist = edit_distance(name, candidate);
        if dist <= max_distance && best.map_or(true, |(_, d)| dist < d) {
            best = Some((candidate, dist));
        }
    }

    best.map(|(closest, _)| format!("did you mean `{}`?", closest))
}

/// Hint for a method missing on a native class. User classes get none.
pub fn native_method(class: &str, method: &str) -> Option<String> {
    let methods = method_names::instance_methods(class)
        .iter()
        .chain(method_names::static_functions(class));
    did_you_mean(method, methods.copied())
}

/// Hint for an unknown `import Name;`.
pub fn native_class(name: &str) -> Option<String> {
    did_you_mean(name, lyra_stdlib::native_classes().iter().map(|c| c.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_you_mean() {
        let candidates = ["counter", "count", "name", "value"];

        assert_eq!(
            did_you_mean("conter", candidates.iter().copied()),
            Some("did you mean `counter`?".to_string())
        );
        assert_eq!(did_you_mean("cout", candidates.iter().copied()), Some("did you mean `count`?".to_string()));
        assert_eq!(did_you_mean("xyz", candidates.iter().copied()), None);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "hello"), 5);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", "abd"), 1);
    }

    #[test]
    fn native_names() {
        assert_eq!(native_method("String", "toUppercase"), Some("did you mean `toUpperCase`?".to_string()));
        assert_eq!(native_method("Counter", "inc"), None);
        assert_eq!(native_class("Sytem"), Some("did you mean `System`?".to_string()));
    }
}
