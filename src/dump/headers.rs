//! Header block serialization.

use crate::model::HeaderMultimap;

/// Renders headers as `Name: value` lines.
///
/// Every value gets its own line under the repeated name, in insertion order;
/// values are written verbatim with no folding or escaping. Lines end in `\n`.
pub fn headers_to_string(headers: &HeaderMultimap) -> String {
    let mut out = String::new();
    for (name, values) in headers.iter() {
        out.push_str(name);
        out.push_str(": ");
        for (i, value) in values.iter().enumerate() {
            out.push_str(value);
            if i != values.len() - 1 {
                out.push('\n');
                out.push_str(name);
                out.push_str(": ");
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_valued_header_repeats_name() {
        let headers: HeaderMultimap = [("X-Foo", "a"), ("X-Foo", "b")].into_iter().collect();
        assert_eq!(headers_to_string(&headers), "X-Foo: a\nX-Foo: b\n");
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let headers: HeaderMultimap = [("Zeta", "1"), ("Alpha", "2"), ("Zeta", "3")]
            .into_iter()
            .collect();
        assert_eq!(headers_to_string(&headers), "Zeta: 1\nZeta: 3\nAlpha: 2\n");
    }

    #[test]
    fn test_values_are_verbatim() {
        let headers: HeaderMultimap = [("X-Odd", "  spaced, a;b  ")].into_iter().collect();
        assert_eq!(headers_to_string(&headers), "X-Odd:   spaced, a;b  \n");
    }

    #[test]
    fn test_empty_headers() {
        assert_eq!(headers_to_string(&HeaderMultimap::new()), "");
    }

    #[test]
    fn test_name_without_values_writes_one_line() {
        let mut headers = HeaderMultimap::new();
        headers.insert("X-Empty", Vec::new());
        assert_eq!(headers_to_string(&headers), "X-Empty: \n");
    }
}
