//! Human-readable interval strings ("24h", "1d6h30m").

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([dhms])").expect("duration pattern is valid"));

/// Convert a duration string to whole seconds.
///
/// The string is a concatenation of `<integer><unit>` tokens with unit one of
/// `d`, `h`, `m`, `s`. Anything that is not a token is skipped, so garbage
/// input yields 0 rather than an error.
pub fn parse_duration(input: &str) -> u64 {
    TOKEN
        .captures_iter(input)
        .filter_map(|caps| {
            let amount: u64 = caps[1].parse().ok()?;
            let unit = match &caps[2] {
                "d" => 86_400,
                "h" => 3_600,
                "m" => 60,
                _ => 1,
            };
            Some(amount.saturating_mul(unit))
        })
        .fold(0u64, u64::saturating_add)
}

/// Same as [`parse_duration`], as a `std::time::Duration`.
pub fn to_duration(input: &str) -> Duration {
    Duration::from_secs(parse_duration(input))
}
