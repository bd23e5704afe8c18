//! Extremely lightweight command line argument parser.
//!
//! There is no schema: every dash-prefixed token becomes a key, everything else
//! is collected as a positional.
//!
//! - `--foo` / `-f` are `true`, `--no-foo` / `--disable-foo` are `false`
//! - `--foo bar`, `--foo=bar`, `--foo="bar"` set `foo` to `"bar"`
//! - `-abc` sets `a`, `b` and `c` to `true`
//! - numeric values become numbers, `true`/`false` become booleans
//! - `--redis.port 9999` nests into `{ redis: { port: 9999 } }`
//! - repeating a flag with values collects them into a list
//! - `--` stops parsing; the rest goes to the positionals (`argv`)

mod parser;
mod value;

use std::ffi::OsString;
use std::sync::OnceLock;

pub use parser::parse;
pub use value::{Args, Map, Value};

/// Parsed arguments of the current process (program path excluded).
///
/// The first call parses [`std::env::args_os`]; later calls return the same
/// cached result. Arguments that are not valid UTF-8 are converted lossily.
pub fn argv() -> &'static Args {
    static PARSED: OnceLock<Args> = OnceLock::new();
    PARSED.get_or_init(|| {
        let args = parse(lossy_tokens(std::env::args_os().skip(1)));
        tracing::debug!(
            keys = args.len(),
            positional = args.positional().len(),
            "parsed process arguments"
        );
        args
    })
}

fn lossy_tokens(args: impl IntoIterator<Item = OsString>) -> Vec<String> {
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}
