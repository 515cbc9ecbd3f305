//! Interactive question/answer session
//!
//! One question is in flight at a time. Nothing that happens while answering
//! a question ends the session; failures come back as answers.

use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::Input;
use tracing::{info, warn};

use crate::capability::ValidatedQuery;
use crate::completion::TextGenerator;
use crate::engine::Database;
use crate::executor::QueryExecutor;
use crate::output::{Answer, OutputFormat};
use crate::translator::Translator;

/// Input that ends the session
pub const QUIT_COMMAND: &str = "quit";

const PROMPT: &str = "Ask a question or 'quit'";

/// True iff the input asks to end the session
#[must_use]
pub fn is_quit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(QUIT_COMMAND)
}

/// Translator and executor sharing one database handle
pub struct Session<'a, D, G> {
    translator: Translator<'a, D, G>,
    executor: QueryExecutor<'a, D>,
}

impl<'a, D: Database, G: TextGenerator> Session<'a, D, G> {
    pub fn new(translator: Translator<'a, D, G>, executor: QueryExecutor<'a, D>) -> Self {
        Self { translator, executor }
    }

    /// Answer one question
    pub async fn answer(&self, question: &str) -> Answer {
        let query = match self.translator.translate(question).await {
            Ok(query) => query,
            Err(err) => {
                warn!(error_code = err.error_code(), error = %err, "translation failed");
                let sql = ValidatedQuery::could_not_generate();
                return Answer::new(question, sql.into_inner(), format!("Error: {}", err.message()));
            }
        };

        let result = self.executor.execute(&query).await;
        Answer::new(question, query.into_inner(), result)
    }

    /// Read questions until `quit` or end of input, printing each answer
    ///
    /// A terminal gets an interactive prompt. Piped input is read line by line.
    pub async fn run(&self, format: OutputFormat) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        if stdin.is_terminal() {
            self.run_with(prompted_lines(), &mut stdout, format).await
        } else {
            self.run_with(stdin.lock().lines(), &mut stdout, format).await
        }
    }

    /// Answer each line of `lines` until `quit` or the lines run out
    ///
    /// Blank lines are skipped. A read error ends the session like end of input.
    pub async fn run_with<I, W>(
        &self,
        lines: I,
        out: &mut W,
        format: OutputFormat,
    ) -> io::Result<()>
    where
        I: IntoIterator<Item = io::Result<String>>,
        W: Write,
    {
        for line in lines {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    info!(error = %err, "input closed");
                    break;
                }
            };

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if is_quit(question) {
                break;
            }

            if format == OutputFormat::Text {
                writeln!(out, "Generating SQL query…")?;
            }
            let answer = self.answer(question).await;
            format.write(out, &answer)?;
        }

        Ok(())
    }
}

/// Lines typed at an interactive prompt, ending when the prompt fails
fn prompted_lines() -> impl Iterator<Item = io::Result<String>> {
    std::iter::from_fn(|| {
        match Input::<String>::new().with_prompt(PROMPT).allow_empty(true).interact_text() {
            Ok(line) => Some(Ok(line)),
            Err(err) => {
                info!(error = %err, "input closed");
                None
            }
        }
    })
}
