//! Tokenizer for free-form `"key value, key value"` input lines.
//!
//! A line is a comma-separated list of fragments; each fragment is a key
//! followed by one or more value words. Single quotes protect a span from
//! both whitespace normalization and splitting, so a value may contain
//! spaces (and a fragment may contain commas) when quoted.
//!
//! Parsing is all-or-nothing: any failure aborts the whole line.

use std::collections::BTreeMap;

use crate::error::ParseError;

/// Separator between fragments of a line.
pub const SEGMENT_SEPARATOR: char = ',';

/// Separator between the key and value words inside a fragment.
pub const WORD_SEPARATOR: char = ' ';

/// Quote character that protects a span from normalization and splitting.
pub const QUOTE: char = '\'';

/// Collapses runs of spaces to one and trims both ends, leaving spans
/// delimited by any of `quotes` untouched (their inner spacing preserved).
///
/// # Errors
///
/// Returns [`ParseError::UnterminatedQuote`] when a quoted span is still
/// open at end of input.
pub fn normalize_spaces(origin: &str, quotes: &[char]) -> Result<String, ParseError> {
    let origin = origin.trim();
    let mut out = String::with_capacity(origin.len());
    let mut top_is_space = false;
    let mut in_quote: Option<char> = None;

    for c in origin.chars() {
        if let Some(quote) = in_quote {
            out.push(c);
            if c == quote {
                in_quote = None;
            }
        } else if quotes.contains(&c) {
            in_quote = Some(c);
            out.push(c);
            top_is_space = false;
        } else if c != WORD_SEPARATOR {
            out.push(c);
            top_is_space = false;
        } else if !top_is_space {
            out.push(WORD_SEPARATOR);
            top_is_space = true;
        }
    }

    if let Some(quote) = in_quote {
        return Err(ParseError::UnterminatedQuote { quote });
    }
    Ok(out)
}

/// Splits `input` on `separator`, treating text between two occurrences of
/// `except` as one indivisible span regardless of separators inside it.
///
/// The `except` characters are retained in the output tokens so a later,
/// finer-grained split sees the span boundaries too. Consecutive separators
/// produce empty tokens; a trailing empty token is dropped.
pub fn split_except(input: &str, separator: char, except: char) -> Vec<String> {
    let input = input.trim();
    let mut tokens = Vec::new();
    let mut block = String::new();
    let mut in_except = false;

    for c in input.chars() {
        if in_except {
            block.push(c);
            if c == except {
                in_except = false;
            }
        } else if c == except {
            in_except = true;
            block.push(c);
        } else if c == separator {
            tokens.push(std::mem::take(&mut block));
        } else {
            block.push(c);
        }
    }
    if !block.is_empty() {
        tokens.push(block);
    }
    tokens
}

/// Strips one pair of surrounding quote characters, if present.
fn unquote(token: String) -> String {
    let mut chars = token.chars();
    if token.len() >= 2 && chars.next() == Some(QUOTE) && chars.last() == Some(QUOTE) {
        token[QUOTE.len_utf8()..token.len() - QUOTE.len_utf8()].to_string()
    } else {
        token
    }
}

/// Parses a raw line into an order-irrelevant key to value mapping.
///
/// Each fragment splits into `[key, value words...]`; the value words are
/// rejoined with commas so a value can itself carry list-like sub-items
/// (a value may contain commas, a key may not).
///
/// # Errors
///
/// - [`ParseError::UnterminatedQuote`] for an unclosed quoted span;
/// - [`ParseError::DuplicateKey`] when a key repeats within the line;
/// - [`ParseError::MissingValue`] when a fragment has no value word.
pub fn parse_line(raw: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let normalized = normalize_spaces(raw, &[QUOTE])?;
    let fragments = split_except(&normalized, SEGMENT_SEPARATOR, QUOTE);
    if fragments.is_empty() {
        return Err(ParseError::MissingValue {
            fragment: normalized,
        });
    }

    let mut fields = BTreeMap::new();
    for fragment in fragments {
        let fragment = normalize_spaces(&fragment, &[QUOTE])?;
        let tokens = split_except(&fragment, WORD_SEPARATOR, QUOTE);
        if tokens.len() < 2 {
            return Err(ParseError::MissingValue { fragment });
        }

        let mut tokens = tokens.into_iter().map(unquote);
        let key = match tokens.next() {
            Some(key) => key,
            None => unreachable!(),
        };
        let value = tokens.collect::<Vec<_>>().join(",");

        if fields.contains_key(&key) {
            return Err(ParseError::DuplicateKey { key });
        }
        fields.insert(key, value);
    }

    Ok(fields)
}
