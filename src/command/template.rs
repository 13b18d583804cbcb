//! printf-style argument templates.

use crate::error::ClitoolsError;
use crate::Result;

/// Substitute `params` into `format`.
///
/// Supports `%s` (next parameter), `%N$s` (N-th parameter, 1-based) and
/// `%%` (literal percent). Any other `%` sequence is kept verbatim.
/// Surplus parameters are ignored; missing ones are an error.
pub(crate) fn render(format: &str, params: &[String]) -> Result<String> {
    let mut out = String::with_capacity(format.len());
    let mut next = 0usize;
    let mut expected = 0usize;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') => {
                chars.next();
                next += 1;
                expected = expected.max(next);
                if let Some(p) = params.get(next - 1) {
                    out.push_str(p);
                }
            }
            Some(d) if d.is_ascii_digit() => {
                let mut lookahead = chars.clone();
                let mut digits = String::new();
                while let Some(d) = lookahead.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    lookahead.next();
                }
                let positional = lookahead.next() == Some('$') && lookahead.next() == Some('s');
                match digits.parse::<usize>() {
                    Ok(index) if positional && index > 0 => {
                        chars = lookahead;
                        expected = expected.max(index);
                        if let Some(p) = params.get(index - 1) {
                            out.push_str(p);
                        }
                    }
                    _ => out.push('%'),
                }
            }
            _ => out.push('%'),
        }
    }

    if expected > params.len() {
        return Err(ClitoolsError::Template {
            format: format.to_string(),
            expected,
            given: params.len(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sequential() {
        let got = render("--user=%s --host=%s", &params(&["a", "b"])).unwrap();
        assert_eq!(got, "--user=a --host=b");
    }

    #[test]
    fn test_positional() {
        let got = render("%2$s:%1$s:%2$s", &params(&["x", "y"])).unwrap();
        assert_eq!(got, "y:x:y");
    }

    #[test]
    fn test_literal_percent() {
        let got = render("100%% %s %d", &params(&["done"])).unwrap();
        assert_eq!(got, "100% done %d");
    }

    #[test]
    fn test_too_few_params() {
        let err = render("%s=%s", &params(&["only"])).unwrap_err();
        assert!(matches!(
            err,
            ClitoolsError::Template {
                expected: 2,
                given: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_surplus_params_ignored() {
        let got = render("-e %s", &params(&["a", "b"])).unwrap();
        assert_eq!(got, "-e a");
    }
}
