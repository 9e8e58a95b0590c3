//! Percent-encoding and query-string helpers used by the share-link parsers.

/// Encodes a string using URL percent-encoding.
///
/// Everything except ASCII alphanumerics and `-_.~` is escaped.
///
/// # Examples
/// ```
/// use serverconfig::utils::url::percent_encode;
///
/// assert_eq!(percent_encode("obfs=http;obfs-host=a.b"), "obfs%3Dhttp%3Bobfs-host%3Da.b");
/// ```
pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Decodes a percent-encoded string.
///
/// Truncated or non-hex escapes are passed through unchanged, and invalid
/// UTF-8 produced by decoding is replaced rather than rejected. `+` is not
/// treated as a space.
///
/// # Examples
/// ```
/// use serverconfig::utils::url::percent_decode;
///
/// assert_eq!(percent_decode("My%20Node"), "My Node");
/// assert_eq!(percent_decode("100%"), "100%");
/// ```
pub fn percent_decode(input: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned()
}

/// Splits a query string into ordered `(key, value)` pairs.
///
/// Pairs are separated by `&` and split on the first `=`. Keys and values are
/// percent-decoded, empty values are kept and repeated keys are preserved in
/// order. A leading `?` is ignored.
pub fn parse_query(input: &str) -> Vec<(String, String)> {
    let input = input.strip_prefix('?').unwrap_or(input);
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (percent_decode(key), percent_decode(value)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// Returns the value of the first pair named `key`.
pub fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
