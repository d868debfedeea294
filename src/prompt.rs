//! Interactive question flow that builds a configuration.
//!
//! The flow asks a subset of questions depending on the [`Level`], starting
//! from a base configuration whose values serve as defaults. It then
//! validates through the same [`ScriptConfig::validate`] as batch input; when
//! a fragment rule is violated it reports the rule and asks again only the
//! questions for the fields the error names.
use std::io::{BufRead, Write};

use crate::config::{ErrTrap, ExitTrap, RawConfig, ScriptConfig, Usage, UtilsMode};
use crate::error::{ConfigError, PromptError};
use crate::logging::Logger;

/// How many questions get asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Level {
    /// No questions; the base configuration is used as-is.
    #[value(alias = "b")]
    Batch,
    /// Only essential questions.
    #[value(alias = "d")]
    Default,
    /// Also shell options, traps and dry-run mode.
    #[value(alias = "a")]
    Advanced,
    /// Every question.
    #[value(alias = "f")]
    Full,
}

/// Every configuration field in the order questions are asked, with the
/// lowest level that asks it.
const QUESTIONS: [(&str, Level); 13] = [
    ("logging_utils", Level::Default),
    ("options", Level::Default),
    ("positionals", Level::Default),
    ("usage", Level::Default),
    ("utils", Level::Default),
    ("set_e", Level::Advanced),
    ("set_x", Level::Advanced),
    ("err_trap", Level::Advanced),
    ("exit_trap", Level::Advanced),
    ("dry", Level::Advanced),
    ("use_env", Level::Full),
    ("greadlink", Level::Full),
    ("main", Level::Full),
];

/// Asks questions on `output` and reads answers from `input`.
#[derive(Debug)]
pub struct Questionnaire<'a, R, W> {
    input: R,
    output: W,
    log: &'a Logger,
    file_output: bool,
}

impl<'a, R: BufRead, W: Write> Questionnaire<'a, R, W> {
    /// Create a questionnaire.
    ///
    /// `file_output` tells whether the script goes to a file, which offers
    /// the full choice of where helpers are stored.
    pub const fn new(input: R, output: W, log: &'a Logger, file_output: bool) -> Self {
        Self {
            input,
            output,
            log,
            file_output,
        }
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim().to_string())
    }

    /// Ask a closed question.
    ///
    /// An answer containing `y` but no `n` means yes, and the reverse means
    /// no (case-insensitive). Any other answer takes `default`, or is asked
    /// again when there is none. An answer containing both is asked again.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Closed`] on end of input and
    /// [`PromptError::Io`] on I/O failure.
    pub fn ask_yes_no(&mut self, question: &str, default: Option<bool>) -> Result<bool, PromptError> {
        let hint = match default {
            None => "[y/n]",
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
        };
        writeln!(self.output)?;
        writeln!(self.output, "{question} {hint}")?;
        let prompt = match default {
            None => "Choice: ".to_string(),
            Some(d) => format!("Choice (empty for default: {}): ", if d { "yes" } else { "no" }),
        };

        loop {
            let answer = self.read_answer(&prompt)?.to_lowercase();
            match (answer.contains('y'), answer.contains('n'), default) {
                (true, false, _) => return Ok(true),
                (false, true, _) => return Ok(false),
                (true, true, _) => {
                    self.log.error("Ambiguous input. Please specify either “y” or “n”.");
                }
                (false, false, Some(d)) => return Ok(d),
                (false, false, None) => {
                    self.log.error("Invalid input. Please specify either “y” or “n”.");
                }
            }
        }
    }

    /// Ask a question with numbered options and return the 0-based index of
    /// the chosen one.
    ///
    /// An empty answer takes `default`; anything but a number in range is
    /// asked again.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Closed`] on end of input and
    /// [`PromptError::Io`] on I/O failure.
    pub fn ask_choice(
        &mut self,
        question: &str,
        options: &[&str],
        default: Option<usize>,
    ) -> Result<usize, PromptError> {
        writeln!(self.output)?;
        writeln!(self.output, "{question}")?;
        for (i, option) in options.iter().enumerate() {
            let number = i + 1;
            match default {
                None => writeln!(self.output, "  {number}. {option}")?,
                Some(d) if d == i => writeln!(self.output, "  [Default] {number}. {option}")?,
                Some(_) => writeln!(self.output, "            {number}. {option}")?,
            }
        }
        let prompt = if default.is_some() {
            "Enter the number of your choice (empty for default): "
        } else {
            "Enter the number of your choice: "
        };

        loop {
            let answer = self.read_answer(prompt)?;
            if answer.is_empty()
                && let Some(d) = default
            {
                return Ok(d);
            }
            if let Ok(choice) = answer.parse::<usize>()
                && (1..=options.len()).contains(&choice)
            {
                return Ok(choice - 1);
            }
            self.log.error(&format!(
                "Invalid input. Please enter a number in 1–{}.",
                options.len()
            ));
        }
    }

    /// Ask a choice question for an integer-coded field whose first code is
    /// `first`, keeping the current value as default when it is in range.
    fn ask_code(
        &mut self,
        question: &str,
        options: &[&str],
        first: i64,
        current: i64,
    ) -> Result<i64, PromptError> {
        let default = current
            .checked_sub(first)
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|&i| i < options.len());
        let index = self.ask_choice(question, options, default)?;
        // Option lists are a handful of entries long.
        Ok(first + i64::try_from(index).unwrap_or(0))
    }

    /// Ask the question for one configuration field, storing the answer in
    /// `raw`.
    fn ask_field(&mut self, raw: &mut RawConfig, field: &str) -> Result<(), PromptError> {
        match field {
            "use_env" => raw.use_env = self.ask_yes_no("Use env-based shebang?", Some(raw.use_env))?,
            "greadlink" => {
                raw.greadlink = self.ask_yes_no("Support macOS’ “greadlink”?", Some(raw.greadlink))?;
            }
            "logging_utils" => {
                raw.logging_utils = self.ask_yes_no("Add logging utils?", Some(raw.logging_utils))?;
            }
            "set_e" => {
                raw.set_e = self.ask_yes_no(
                    "Add “set -e”? WARNING: Make sure you know its many exceptions before activating this.",
                    Some(raw.set_e),
                )?;
            }
            "set_x" => {
                raw.set_x = self.ask_yes_no(
                    "Add “set -x”? (Log executed commands to stderr.)",
                    Some(raw.set_x),
                )?;
            }
            "err_trap" => {
                raw.err_trap = self.ask_code(
                    "Add an error (ERR) trap? NB: Can be hard to master.",
                    &[
                        "No",
                        "Yes, root level only",
                        "Yes, inherited by functions, subshells, etc. (“set -E”)",
                    ],
                    ErrTrap::None.code(),
                    raw.err_trap,
                )?;
            }
            "exit_trap" => {
                raw.exit_trap = self.ask_code(
                    "Add an exit trap? (Typically for cleanup or logging purposes.)",
                    &[
                        "No",
                        "Yes, logging only",
                        "Yes, with a temporary directory",
                        "Yes, with a dynamic list of files or directories to delete",
                    ],
                    ExitTrap::None.code(),
                    raw.exit_trap,
                )?;
            }
            "main" => {
                raw.main = self.ask_yes_no(
                    "Use a “main” function? NB: Its local variables are still visible from within subfunctions.",
                    Some(raw.main),
                )?;
            }
            "options" => raw.options = self.ask_yes_no("Support options?", Some(raw.options))?,
            "positionals" => {
                raw.positionals =
                    self.ask_yes_no("Support positional parameters?", Some(raw.positionals))?;
            }
            "usage" => {
                raw.usage = self.ask_code(
                    "How should the “print_help” function be called?",
                    &[
                        "Tied to “-h” and “--help” options",
                        "Also called if no argument is given",
                        "Let me call it the way I want later",
                    ],
                    Usage::HelpOption.code(),
                    raw.usage,
                )?;
            }
            "dry" => raw.dry = self.ask_yes_no("Implement a “dry run” mode?", Some(raw.dry))?,
            "utils" => raw.utils = self.ask_utils(raw.utils)?,
            _ => {}
        }
        Ok(())
    }

    fn ask_utils(&mut self, current: i64) -> Result<i64, PromptError> {
        if self.file_output {
            return self.ask_code(
                "Where should utility functions be stored?",
                &[
                    "Within the script itself",
                    "Within a “common.sh” file alongside the script (overwrite if it exists)",
                    "Within a “common.sh” file alongside the script (add suffix if it exists)",
                ],
                UtilsMode::Inline.code(),
                current,
            );
        }
        let inline = self.ask_yes_no(
            "Should utility functions be stored in the script itself? (vs. separately)",
            Some(current == UtilsMode::Inline.code()),
        )?;
        Ok(if inline {
            UtilsMode::Inline.code()
        } else {
            UtilsMode::Overwrite.code()
        })
    }

    /// Ask the questions of `level`, then validate, asking again the
    /// questions for whatever fields a validation error names.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Closed`] or [`PromptError::Io`] when answers
    /// cannot be read, and [`PromptError::Config`] for an error no question
    /// can fix.
    pub fn run(&mut self, level: Level, base: RawConfig) -> Result<ScriptConfig, PromptError> {
        let mut raw = base;
        for (field, asked_from) in QUESTIONS {
            if level >= asked_from {
                self.ask_field(&mut raw, field)?;
            }
        }

        loop {
            match raw.validate() {
                Ok(config) => return Ok(config),
                Err(e @ (ConfigError::Dependency(_) | ConfigError::OutOfDomain { .. })) => {
                    self.log.error(&e.to_string());
                    let fields: Vec<String> = e.fields().iter().map(|f| (*f).to_string()).collect();
                    self.log
                        .info(&format!("Please answer again: {}", fields.join(", ")));
                    for field in &fields {
                        self.ask_field(&mut raw, field)?;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn questionnaire<'a>(
        answers: &str,
        log: &'a Logger,
        file_output: bool,
    ) -> Questionnaire<'a, Cursor<Vec<u8>>, Vec<u8>> {
        Questionnaire::new(
            Cursor::new(answers.as_bytes().to_vec()),
            Vec::new(),
            log,
            file_output,
        )
    }

    #[test]
    fn yes_no_semantics() {
        let log = Logger::new("test");
        let mut q = questionnaire("yes\nNope\n\nyn\nmaybe\nY\n", &log, false);
        assert!(q.ask_yes_no("A?", Some(false)).unwrap());
        assert!(!q.ask_yes_no("B?", Some(true)).unwrap());
        assert!(q.ask_yes_no("C?", Some(true)).unwrap());
        // "yn" is ambiguous and "maybe" has a y: the first is re-asked.
        assert!(q.ask_yes_no("D?", None).unwrap());
        assert!(q.ask_yes_no("E?", None).unwrap());
    }

    #[test]
    fn yes_no_without_default_reasks_on_empty() {
        let log = Logger::new("test");
        let mut q = questionnaire("\n\nn\n", &log, false);
        assert!(!q.ask_yes_no("A?", None).unwrap());
    }

    #[test]
    fn yes_no_prints_hint() {
        let log = Logger::new("test");
        let mut q = questionnaire("\n", &log, false);
        q.ask_yes_no("Add logging utils?", Some(true)).unwrap();
        let shown = String::from_utf8(q.output).unwrap();
        assert_eq!(
            shown,
            "\nAdd logging utils? [Y/n]\nChoice (empty for default: yes): "
        );
    }

    #[test]
    fn choice_semantics() {
        let log = Logger::new("test");
        let mut q = questionnaire("\n0\n4\nx\n3\n", &log, false);
        assert_eq!(q.ask_choice("Q?", &["a", "b", "c"], Some(1)).unwrap(), 1);
        assert_eq!(q.ask_choice("Q?", &["a", "b", "c"], Some(1)).unwrap(), 2);
    }

    #[test]
    fn choice_marks_default() {
        let log = Logger::new("test");
        let mut q = questionnaire("2\n", &log, false);
        q.ask_choice("Pick", &["a", "b"], Some(0)).unwrap();
        let shown = String::from_utf8(q.output).unwrap();
        assert!(shown.contains("  [Default] 1. a\n            2. b\n"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let log = Logger::new("test");
        let mut q = questionnaire("", &log, false);
        assert!(matches!(
            q.ask_yes_no("A?", Some(true)),
            Err(PromptError::Closed)
        ));
    }

    #[test]
    fn batch_level_asks_nothing() {
        let log = Logger::new("test");
        let mut q = questionnaire("", &log, false);
        let config = q.run(Level::Batch, RawConfig::default()).unwrap();
        assert_eq!(config.to_raw(), RawConfig::default());
        assert!(q.output.is_empty());
    }

    #[test]
    fn default_level_with_empty_answers_keeps_base() {
        let log = Logger::new("test");
        let mut q = questionnaire("\n\n\n\n\n", &log, true);
        let base = RawConfig {
            usage: 2,
            utils: 2,
            ..RawConfig::default()
        };
        let config = q.run(Level::Default, base).unwrap();
        assert_eq!(config.to_raw(), base);
    }

    #[test]
    fn stdout_target_simplifies_utils_question() {
        let log = Logger::new("test");
        // logging, options, positionals, usage, then "store inline?" -> no
        let mut q = questionnaire("\n\n\n\nn\n", &log, false);
        let config = q.run(Level::Default, RawConfig::default()).unwrap();
        assert_eq!(config.utils(), UtilsMode::Overwrite);
    }

    #[test]
    fn dependency_violation_reasks_named_fields() {
        let log = Logger::new("test");
        // Base needs main; only err_trap and main are asked again.
        let base = RawConfig {
            err_trap: 2,
            ..RawConfig::default()
        };
        let mut q = questionnaire("\ny\n", &log, false);
        let config = q.run(Level::Batch, base).unwrap();
        assert_eq!(config.err_trap(), ErrTrap::Inherited);
        assert!(config.main());
        let shown = String::from_utf8(q.output).unwrap();
        assert!(shown.contains("Add an error (ERR) trap?"));
        assert!(shown.contains("Use a “main” function?"));
        assert!(!shown.contains("Add logging utils?"));
    }

    #[test]
    fn out_of_domain_base_value_is_asked_again() {
        let log = Logger::new("test");
        let base = RawConfig {
            usage: 0,
            ..RawConfig::default()
        };
        let mut q = questionnaire("\n3\n", &log, false);
        let config = q.run(Level::Batch, base).unwrap();
        assert_eq!(config.usage(), Usage::Manual);
    }

    #[test]
    fn extreme_base_values_have_no_default() {
        let log = Logger::new("test");
        for usage in [i64::MIN, i64::MAX] {
            let base = RawConfig {
                usage,
                ..RawConfig::default()
            };
            // logging_utils, options, positionals, then usage twice: the
            // empty answer has no default to fall back on.
            let mut q = questionnaire("\n\n\n\n2\n\n", &log, false);
            let config = q.run(Level::Default, base).unwrap();
            assert_eq!(config.usage(), Usage::NoArguments, "usage {usage}");
        }
    }

    #[test]
    fn full_level_asks_every_field_once() {
        let log = Logger::new("test");
        let mut q = questionnaire(&"\n".repeat(13), &log, true);
        q.run(Level::Full, RawConfig::default()).unwrap();
        let shown = String::from_utf8(q.output).unwrap();
        assert_eq!(shown.matches("Choice (empty for default").count(), 9);
        assert_eq!(shown.matches("Enter the number of your choice").count(), 4);
    }
}
