//! Token classification.
//!
//! Tokens are processed left to right by a single cursor. A flag may consume
//! the token that follows it as its value; `--` hands every remaining token to
//! the positionals.

use crate::value::{Args, Value};

/// Parse a list of argument tokens.
///
/// This never fails: a token that looks odd still ends up somewhere, either
/// as a (possibly empty) key or as a positional.
///
/// ```
/// let args = argh::parse(["--redis.port", "9999", "--verbose", "file.txt"]);
/// assert_eq!(args.get_path("redis.port").and_then(|v| v.as_i64()), Some(9999));
/// assert_eq!(args.flag("verbose"), Some(true));
/// assert_eq!(args.positional(), ["file.txt"]);
/// ```
pub fn parse<I, S>(tokens: I) -> Args
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<S> = tokens.into_iter().collect();
    let mut args = Args::default();

    let mut i = 0usize;
    while i < tokens.len() {
        let token = tokens[i].as_ref();
        i += 1;

        if token == "--" {
            tracing::trace!(remaining = tokens.len() - i, "end of options");
            for rest in &tokens[i..] {
                args.push_positional(rest.as_ref());
            }
            break;
        }

        let Some((dashes, name)) = strip_dashes(token) else {
            tracing::trace!(token, "positional");
            args.push_positional(token);
            continue;
        };

        // -no-foo, --disable-foo
        if let Some(negated) = name
            .strip_prefix("no-")
            .or_else(|| name.strip_prefix("disable-"))
        {
            tracing::trace!(token, key = negated, "negated flag");
            if dashes == 1 && is_short_run(negated) {
                explode(&mut args, negated, false);
            } else {
                args.set(negated, Value::Bool(false));
            }
            continue;
        }

        // --foo=bar, --foo="bar"
        if let Some((key, value)) = split_key_value(dashes, name) {
            tracing::trace!(token, key, value, "inline value");
            args.push_value(key, coerce(value));
            continue;
        }

        match tokens.get(i).map(|next| next.as_ref()) {
            Some(next) if is_value(next) => {
                tracing::trace!(token, key = name, value = next, "flag with value");
                args.push_value(name, coerce(next));
                i += 1;
            }
            next => {
                let flag = next != Some("false");
                if next.is_some_and(is_bool_literal) {
                    i += 1;
                }
                tracing::trace!(token, key = name, flag, "boolean flag");
                if dashes == 1 && is_short_run(name) {
                    explode(&mut args, name, flag);
                } else {
                    args.set(name, Value::Bool(flag));
                }
            }
        }
    }

    args
}

/// Strip one or two leading dashes. Returns `None` for tokens without a dash.
fn strip_dashes(token: &str) -> Option<(usize, &str)> {
    let rest = token.strip_prefix('-')?;
    Some(match rest.strip_prefix('-') {
        Some(rest) => (2, rest),
        None => (1, rest),
    })
}

/// Split `key=value`, dropping one optional quote on either side of the value.
///
/// An empty value (`--foo=`, `--foo=""`) is not treated as a key/value pair.
fn split_key_value(dashes: usize, name: &str) -> Option<(&str, &str)> {
    let (key, raw) = name.split_once('=')?;
    let key = match (key.is_empty(), dashes) {
        (false, _) => key,
        // `--=x`: the second dash is the key.
        (true, 2) => "-",
        (true, _) => return None,
    };
    let value = raw.strip_prefix(['"', '\'']).unwrap_or(raw);
    let value = value.strip_suffix(['"', '\'']).unwrap_or(value);
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// A run of single-character flags like `-abc`.
fn is_short_run(name: &str) -> bool {
    name.chars().count() > 1 && !name.contains(['-', '=', '.'])
}

fn explode(args: &mut Args, run: &str, flag: bool) {
    let mut buf = [0u8; 4];
    for c in run.chars() {
        args.set_literal(c.encode_utf8(&mut buf), Value::Bool(flag));
    }
}

/// Whether the token after a flag can serve as that flag's value.
fn is_value(token: &str) -> bool {
    !token.is_empty() && !token.starts_with('-') && !is_bool_literal(token)
}

fn is_bool_literal(token: &str) -> bool {
    token == "true" || token == "false"
}

/// Turn a raw value into a boolean or number when it is exactly one,
/// otherwise keep the string.
fn coerce(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => Value::String(raw.to_string()),
        },
    }
}

/// Parse a base-10 number that spans the whole string.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent. Rejects `inf`, `NaN`, hex, whitespace and trailing garbage.
fn parse_number(raw: &str) -> Option<f64> {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return None;
    }
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }
    raw.parse().ok()
}
