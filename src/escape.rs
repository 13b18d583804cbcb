//! POSIX shell argument escaping.

use crate::error::ClitoolsError;
use crate::Result;

/// Quote `value` so a POSIX shell re-parses it as exactly one token.
///
/// The value is wrapped in single quotes; embedded single quotes become
/// `'\''`. Empty input is rejected because an empty token would silently
/// vanish from the command line and shift argument positions.
pub fn escape(value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(ClitoolsError::EmptyArgument("argument"));
    }
    if value.contains('\0') {
        return Err(ClitoolsError::InvalidCharacter('\0'));
    }
    Ok(quote(value))
}

/// Quote without the emptiness check; callers have validated already.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Render a program name: bare when it is a plain word, quoted otherwise.
pub(crate) fn quote_program(name: &str) -> String {
    if is_simple_word(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn is_simple_word(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '_' | '-' | '.' | '/' | ':' | '+' | '@' | ',')
        })
}
