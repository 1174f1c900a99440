//! Lenient decoders for the text cells of analyzer snapshots.
//!
//! The analyzer writes scores, lists and annotated numbers as plain text.
//! Each decoder returns `None` for anything it cannot read instead of
//! failing, so a malformed cell becomes "no data" rather than zero.

/// Decode a numeric score cell. Non-finite values are treated as missing.
pub fn decode_score(cell: Option<&str>) -> Option<f64> {
    let value = cell?.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Decode the leading number of an annotated cell such as `"0.93 (12/13)"`.
pub fn decode_leading_number(cell: Option<&str>) -> Option<f64> {
    let token = cell?.split_whitespace().next()?;
    decode_score(Some(token))
}

/// Count the elements of a bracketed list cell such as `['a', 'b']`.
///
/// Commas inside quoted elements are not separators. Unbalanced quotes or a
/// missing bracket yield `None`.
pub fn decode_list_len(cell: Option<&str>) -> Option<f64> {
    let trimmed = cell?.trim();
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return Some(0.0);
    }

    let mut count = 0usize;
    let mut quote: Option<char> = None;
    let mut current_has_content = false;

    for ch in inner.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current_has_content = true;
                }
                ',' => {
                    if !current_has_content {
                        return None;
                    }
                    count += 1;
                    current_has_content = false;
                }
                c if c.is_whitespace() => {}
                _ => current_has_content = true,
            },
        }
    }

    if quote.is_some() {
        return None;
    }
    if current_has_content {
        count += 1;
    }
    Some(count as f64)
}

/// Whether a KG declares provenance: an author, or a usable publisher.
pub fn decode_provenance(author: Option<&str>, publisher: Option<&str>) -> f64 {
    let has_author = author.map(str::trim) != Some("False");
    let has_publisher = !matches!(
        publisher.map(str::trim),
        Some("-") | Some("[]") | Some("absent")
    );
    if has_author || has_publisher {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_score() {
        assert_eq!(decode_score(Some("0.75")), Some(0.75));
        assert_eq!(decode_score(Some(" 1 ")), Some(1.0));
        assert_eq!(decode_score(Some("-")), None);
        assert_eq!(decode_score(Some("")), None);
        assert_eq!(decode_score(Some("nan")), None);
        assert_eq!(decode_score(None), None);
    }

    #[test]
    fn test_decode_leading_number() {
        assert_eq!(decode_leading_number(Some("0.93 (12/13)")), Some(0.93));
        assert_eq!(decode_leading_number(Some("1")), Some(1.0));
        assert_eq!(decode_leading_number(Some("insufficient data")), None);
        assert_eq!(decode_leading_number(Some("   ")), None);
    }

    #[test]
    fn test_decode_list_len() {
        assert_eq!(decode_list_len(Some("[]")), Some(0.0));
        assert_eq!(decode_list_len(Some("['a', 'b', 'c']")), Some(3.0));
        assert_eq!(decode_list_len(Some("['a, with comma', \"b\"]")), Some(2.0));
        assert_eq!(decode_list_len(Some("[1, 2]")), Some(2.0));
        assert_eq!(decode_list_len(Some("False")), None);
        assert_eq!(decode_list_len(Some("['unterminated]")), None);
        assert_eq!(decode_list_len(Some("[, 'a']")), None);
    }

    #[test]
    fn test_decode_provenance() {
        assert_eq!(decode_provenance(Some("False"), Some("-")), 0.0);
        assert_eq!(decode_provenance(Some("False"), Some("absent")), 0.0);
        assert_eq!(decode_provenance(Some("False"), Some("[]")), 0.0);
        assert_eq!(decode_provenance(Some("True"), Some("-")), 1.0);
        assert_eq!(decode_provenance(Some("False"), Some("['W3C']")), 1.0);
        assert_eq!(decode_provenance(None, None), 1.0);
    }
}
