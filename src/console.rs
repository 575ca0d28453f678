//! Output channels and operator confirmation.
//!
//! Two channels with distinct contracts: `emit` carries primary output
//! (machine-consumable, e.g. the CSR PEM) on stdout, `status` carries
//! diagnostic narration on stderr. Keeping them separate means a pipeline
//! like `certkeeper create ... | openssl req -text` only ever sees the CSR.

use std::io::{self, BufRead, Write};

use crate::errors::Result;

pub trait Console {
    /// Primary output. Goes to stdout.
    fn emit(&mut self, line: &str);

    /// Diagnostic output. Goes to stderr.
    fn status(&mut self, line: &str);

    /// Ask the operator a yes/no question. Anything other than an explicit
    /// affirmative answer means no.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Console backed by the real stdio streams.
pub struct StdConsole;

impl Console for StdConsole {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }

    fn status(&mut self, line: &str) {
        eprintln!("{}", line);
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        eprint!("{} [y/N]: ", prompt);
        io::stderr().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
pub mod test_support {
    use super::Console;
    use crate::errors::Result;

    /// Console that records output and replays scripted confirmation answers.
    pub struct ScriptedConsole {
        pub emitted: Vec<String>,
        pub statuses: Vec<String>,
        pub answers: Vec<bool>,
    }

    impl ScriptedConsole {
        pub fn new(answers: Vec<bool>) -> Self {
            Self {
                emitted: Vec::new(),
                statuses: Vec::new(),
                answers,
            }
        }
    }

    impl Console for ScriptedConsole {
        fn emit(&mut self, line: &str) {
            self.emitted.push(line.to_string());
        }

        fn status(&mut self, line: &str) {
            self.statuses.push(line.to_string());
        }

        fn confirm(&mut self, _prompt: &str) -> Result<bool> {
            Ok(if self.answers.is_empty() {
                false
            } else {
                self.answers.remove(0)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("yes\n"));
        assert!(is_affirmative("  YES  "));

        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
        assert!(!is_affirmative("sure"));
    }
}
