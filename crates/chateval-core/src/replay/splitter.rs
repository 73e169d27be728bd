//! Splits transcript lines into ordered sub-turns
//!
//! Transcript lines join utterances with `</s>`. Three-turn transcripts close
//! the second utterance with `<\s>` instead, so both tags are matched
//! literally.

use super::TurnMode;
use crate::error::{ChatEvalError, ChatEvalResult};

/// Separates the first utterance from the second
pub const TURN_DELIMITER: &str = "</s>";

/// Separates the second utterance from the third in three-turn lines
pub const THIRD_TURN_DELIMITER: &str = "<\\s>";

/// Split one transcript line into the sub-turns of `mode`
///
/// `line_no` is 1-based and only used in error messages.
pub fn split_turns(line: &str, mode: TurnMode, line_no: usize) -> ChatEvalResult<Vec<String>> {
    let line = strip_line_ending(line);

    match mode {
        TurnMode::Single => Ok(vec![line.to_string()]),
        TurnMode::Pair => {
            let segments: Vec<&str> = line.split(TURN_DELIMITER).collect();
            if segments.len() < 2 {
                return Err(missing_delimiter(line_no, mode, TURN_DELIMITER));
            }
            if segments.len() > 2 {
                tracing::debug!(
                    "line {}: ignoring {} extra `{}` segments",
                    line_no,
                    segments.len() - 2,
                    TURN_DELIMITER
                );
            }
            Ok(vec![segments[0].to_string(), segments[1].to_string()])
        }
        TurnMode::Triple => {
            let mut primary = line.split(TURN_DELIMITER);
            let (first, second) = match (primary.next(), primary.next()) {
                (Some(first), Some(second)) => (first, second),
                _ => return Err(missing_delimiter(line_no, mode, TURN_DELIMITER)),
            };
            let third = line
                .split(THIRD_TURN_DELIMITER)
                .nth(1)
                .ok_or_else(|| missing_delimiter(line_no, mode, THIRD_TURN_DELIMITER))?;
            let second = second
                .split(THIRD_TURN_DELIMITER)
                .next()
                .unwrap_or(second);

            Ok([first, second, third]
                .iter()
                .map(|segment| strip_backticks(segment))
                .collect())
        }
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn strip_backticks(segment: &str) -> String {
    segment.replace('`', "")
}

fn missing_delimiter(line_no: usize, mode: TurnMode, delimiter: &str) -> ChatEvalError {
    ChatEvalError::malformed(
        line_no,
        mode,
        format!("missing `{}` delimiter", delimiter),
    )
}
