//! Bracket-aware splitting. Separators nested inside `[...]` never split.

/// Strip one pair of outer brackets, if present.
pub fn strip_brackets(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(trimmed)
}

/// Split `input` on every `sep` that sits at bracket depth zero.
pub fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (offset, ch) in input.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&input[start..offset]);
                start = offset + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Split at the first `sep` at bracket depth zero.
pub fn split_once_top_level(input: &str, sep: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (offset, ch) in input.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                return Some((&input[..offset], &input[offset + c.len_utf8()..]));
            }
            _ => {}
        }
    }
    None
}

/// Tokens of a dataVals string: outer brackets removed, split on top-level commas.
/// `"[]"` and `""` have no tokens.
pub fn tokens(raw: &str) -> Vec<&str> {
    let inner = strip_brackets(raw);
    if inner.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(inner, ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_brackets_do_not_split() {
        assert_eq!(tokens("[1,[2,3],4]"), vec!["1", "[2,3]", "4"]);
    }

    #[test]
    fn empty_list_has_no_tokens() {
        assert!(tokens("[]").is_empty());
        assert!(tokens("").is_empty());
    }

    #[test]
    fn colon_split_ignores_nested_colons() {
        assert_eq!(
            split_once_top_level("DependFuncVals1:[Value:10,Rate:5]", ':'),
            Some(("DependFuncVals1", "[Value:10,Rate:5]"))
        );
        assert_eq!(split_once_top_level("[a:b]", ':'), None);
    }

    #[test]
    fn keyed_value_with_nested_list_stays_whole() {
        assert_eq!(
            tokens("[1000,DependFuncId1:50,DependFuncVals1:[0,300]]"),
            vec!["1000", "DependFuncId1:50", "DependFuncVals1:[0,300]"]
        );
    }
}
