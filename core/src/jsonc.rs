//! Comment-tolerant parsing for settings documents.
//!
//! Settings are JSON with `//` line comments and `/* */` block comments.
//! Apart from comments the text must be standard JSON; trailing commas are
//! rejected.

use cascade_sdk::ParseCause;
use serde::de::DeserializeOwned;

const UNTERMINATED_BLOCK_COMMENT: &str = "EOF while parsing a block comment";

/// Parses `text` as JSON with comments into `T`.
pub fn from_str_with_comments<T: DeserializeOwned>(text: &str) -> Result<T, ParseCause> {
    let mut deserializer = serde_json_lenient::Deserializer::from_str(text);
    deserializer.set_allow_comments(true);
    deserializer.set_ignore_trailing_commas(false);

    let value = T::deserialize(&mut deserializer).map_err(parse_cause)?;
    deserializer.end().map_err(parse_cause)?;
    Ok(value)
}

fn parse_cause(err: serde_json_lenient::Error) -> ParseCause {
    let message = err.to_string();
    if err.is_eof() && message.starts_with(UNTERMINATED_BLOCK_COMMENT) {
        ParseCause::MalformedComment {
            line: err.line(),
            column: err.column(),
        }
    } else {
        ParseCause::InvalidJson(message)
    }
}
