use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::error::ParseError;

/// Standard alphabet, padding optional, trailing bits tolerated.
const TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Decodes a Base64 payload in either the standard or the URL-safe alphabet.
///
/// Whitespace is ignored and padding is optional. The first attempt uses the
/// standard alphabet; if that fails the URL-safe characters are mapped back
/// (`_` to `/`, `-` to `+`) and decoding is retried.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, ParseError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if let Ok(decoded) = TOLERANT.decode(&cleaned) {
        return Ok(decoded);
    }

    TOLERANT
        .decode(url_safe_base64_reverse(&cleaned))
        .map_err(|_| ParseError::MalformedBase64)
}

/// Decodes a Base64 payload into text, replacing invalid UTF-8 sequences.
pub fn decode_base64_string(input: &str) -> Result<String, ParseError> {
    decode_base64(input).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Converts a Base64 string to URL-safe Base64 format by replacing specific characters.
pub fn url_safe_base64_apply(input: &str) -> String {
    input.replace('+', "-").replace('/', "_").replace('=', "")
}

/// Encodes a string to URL-safe Base64 format.
pub fn url_safe_base64_encode(input: &str) -> String {
    url_safe_base64_apply(&base64_encode(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_standard_and_url_safe() {
        // "??>" encodes to "Pz8+" in the standard alphabet and "Pz8-" in the URL-safe one
        assert_eq!(decode_base64("Pz8+").unwrap(), b"??>");
        assert_eq!(decode_base64("Pz8-").unwrap(), b"??>");
        assert_eq!(decode_base64("Pz8_").unwrap(), b"??\x3f");
    }

    #[test]
    fn test_decode_without_padding() {
        assert_eq!(decode_base64_string("U1NSLU5vZGU").unwrap(), "SSR-Node");
        assert_eq!(decode_base64_string("U1NSLU5vZGU=").unwrap(), "SSR-Node");
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        assert_eq!(decode_base64_string("U1NS\nLU5v ZGU=").unwrap(), "SSR-Node");
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(decode_base64("not base64!"), Err(ParseError::MalformedBase64));
        assert_eq!(decode_base64("abc?def"), Err(ParseError::MalformedBase64));
    }

    #[test]
    fn test_url_safe_encode() {
        assert_eq!(url_safe_base64_encode("??>"), "Pz8-");
        assert_eq!(url_safe_base64_encode("SSR-Node"), "U1NSLU5vZGU");
    }
}
