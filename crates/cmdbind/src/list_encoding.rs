//! Raw encoding of multi-valued option input.
//!
//! A listable option's raw value is a single string: the reserved sentinel
//! followed by each element, every element preceded by the reserved
//! separator. `"[L:"` alone is the declared-but-empty list; an undeclared
//! list has no raw value at all.

/// Prefix marking a raw value as a multi-value list.
pub const LIST_SENTINEL: &str = "[L:";

/// Separator placed before each element of an encoded list.
pub const LIST_SEPARATOR: char = '\u{0}';

/// Encode `values` as one raw multi-value string.
pub fn encode<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(LIST_SENTINEL);
    for v in values {
        out.push(LIST_SEPARATOR);
        out.push_str(v.as_ref());
    }
    out
}

/// Decode a multi-value string. Returns `None` when `raw` is not encoded.
pub fn decode(raw: &str) -> Option<Vec<String>> {
    let rest = raw.strip_prefix(LIST_SENTINEL)?;
    let Some(rest) = rest.strip_prefix(LIST_SEPARATOR) else {
        return Some(Vec::new());
    };
    Some(rest.split(LIST_SEPARATOR).map(str::to_string).collect())
}

/// Whether `raw` carries the multi-value sentinel.
pub fn is_encoded(raw: &str) -> bool {
    raw.starts_with(LIST_SENTINEL)
}

/// Append one occurrence to an (optional) existing encoded value.
pub fn append(existing: Option<&str>, value: &str) -> String {
    let mut out = match existing {
        Some(prev) if is_encoded(prev) => prev.to_string(),
        Some(prev) => encode([prev]),
        None => LIST_SENTINEL.to_string(),
    };
    out.push(LIST_SEPARATOR);
    out.push_str(value);
    out
}

/// Split a raw value into its elements; a plain value is a single element.
pub fn split(raw: &str) -> Vec<String> {
    decode(raw).unwrap_or_else(|| vec![raw.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_single_empty_are_distinct() {
        assert_eq!(decode(&encode(Vec::<String>::new())), Some(vec![]));
        assert_eq!(decode(&encode([""])), Some(vec![String::new()]));
        assert_ne!(encode(Vec::<String>::new()), encode([""]));
    }

    #[test]
    fn decode_recovers_order() {
        let values = ["b", "a", "c", "a"];
        assert_eq!(decode(&encode(values)).unwrap(), values.to_vec());
    }

    #[test]
    fn plain_values_are_not_encoded() {
        assert_eq!(decode("plain"), None);
        assert_eq!(split("plain"), vec!["plain".to_string()]);
    }

    #[test]
    fn append_accumulates_occurrences() {
        let first = append(None, "x");
        let second = append(Some(&first), "y");
        assert_eq!(split(&second), vec!["x".to_string(), "y".to_string()]);

        let from_plain = append(Some("w"), "z");
        assert_eq!(split(&from_plain), vec!["w".to_string(), "z".to_string()]);
    }
}
