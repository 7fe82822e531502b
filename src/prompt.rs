//! Interactive confirmation before any task runs

use crate::error::PromptError;
use std::io::{BufRead, Write};
use tracing::debug;

/// Number of answers accepted before giving up
pub const MAX_ATTEMPTS: usize = 3;

/// Ask `Do you want to proceed? (y/n)` until a clear answer or `attempts` run out
///
/// Answers are trimmed and case-insensitive. End of input counts as unclear.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    attempts: usize,
) -> Result<(), PromptError> {
    write!(output, "Do you want to proceed? (y/n): ")?;
    output.flush()?;

    for attempt in 1..=attempts {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        match line.trim().to_lowercase().as_str() {
            "y" => {
                debug!("Approval to start has been received");
                return Ok(());
            }
            "n" => {
                debug!("User didn't want to proceed");
                return Err(PromptError::Declined);
            }
            _ if attempt < attempts => {
                write!(output, "Try again (y/n): ")?;
                output.flush()?;
            }
            _ => {}
        }
    }

    debug!("User approval to start can't be interpreted");
    Err(PromptError::Unclear { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answers: &str) -> (Result<(), PromptError>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = confirm(&mut input, &mut output, MAX_ATTEMPTS);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_yes() {
        let (result, out) = ask("y\n");
        assert!(result.is_ok());
        assert_eq!(out, "Do you want to proceed? (y/n): ");

        let (result, _) = ask("  Y \n");
        assert!(result.is_ok());
    }

    #[test]
    fn test_no() {
        let (result, _) = ask("n\n");
        assert!(matches!(result, Err(PromptError::Declined)));
    }

    #[test]
    fn test_retry_then_yes() {
        let (result, out) = ask("maybe\nyes\ny\n");
        assert!(result.is_ok());
        assert_eq!(out.matches("Try again (y/n): ").count(), 2);
    }

    #[test]
    fn test_gives_up_after_three_attempts() {
        let (result, out) = ask("a\nb\nc\ny\n");
        assert!(matches!(result, Err(PromptError::Unclear { attempts: 3 })));
        assert_eq!(out.matches("Try again (y/n): ").count(), 2);
    }

    #[test]
    fn test_end_of_input_is_unclear() {
        let (result, _) = ask("");
        assert!(matches!(result, Err(PromptError::Unclear { .. })));
    }
}
