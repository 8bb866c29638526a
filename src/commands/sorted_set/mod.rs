pub mod zadd;
pub mod zcard;
pub mod zrange;
pub mod zrank;
pub mod zrem;
pub mod zscore;

use crate::commands::command_error::CommandError;

/// Parses a sorted set score. `inf`, `+inf` and `-inf` are accepted, NaN is not.
pub fn parse_score(input: &str) -> Result<f64, CommandError> {
    match input.parse::<f64>() {
        Ok(score) if !score.is_nan() => Ok(score),
        _ => Err(CommandError::InvalidFloat),
    }
}

/// Formats a score the way replies carry it: the shortest text that reads back
/// to the same value, so whole numbers have no fractional part.
pub fn format_score(score: f64) -> String {
    score.to_string()
}
