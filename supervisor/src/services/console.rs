//! Console operator
//!
//! Reads the server choice and commands from stdin, one per line.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::error::{SupervisorError, SupervisorResult};
use crate::traits::Operator;
use crate::types::CandidateList;

pub const COMMAND_PROMPT: &str = "> ";

/// Real operator on stdin/stdout
pub struct ConsoleOperator<R = BufReader<Stdin>, W = Stdout> {
    lines: Lines<R>,
    output: W,
    /// Set once a line was consumed; a cancelled read keeps the prompt shown
    prompt_pending: bool,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self::from_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }

    /// One menu row: `position/total hostname (country-code)`
    pub fn menu_entry(position: usize, total: usize, identifier: &str, country_long: &str, country_short: &str) -> String {
        format!("{position:2}/{total:<2} {identifier:<16} ({country_long:<7}-{country_short:<2})")
    }

    /// Map a menu answer to a selection: a row number or a hostname fragment
    pub fn resolve_answer(answer: &str, candidates: &CandidateList) -> String {
        let answer = answer.trim();
        answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| candidates.get(index))
            .map(|c| c.identifier.clone())
            .unwrap_or_else(|| answer.to_string())
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> ConsoleOperator<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Operator over arbitrary line input and prompt output
    pub fn from_io(input: R, output: W) -> Self {
        Self {
            lines: input.lines(),
            output,
            prompt_pending: true,
        }
    }

    async fn prompt(&mut self, text: &str) -> SupervisorResult<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self) -> SupervisorResult<Option<String>> {
        self.lines
            .next_line()
            .await
            .map_err(|source| SupervisorError::OperatorInput { source })
    }
}

#[async_trait]
impl<R, W> Operator for ConsoleOperator<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn choose_server(&mut self, candidates: &CandidateList) -> SupervisorResult<String> {
        let total = candidates.len();
        let menu: Vec<String> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| ConsoleOperator::menu_entry(i + 1, total, &c.identifier, &c.country_long, &c.country_short))
            .collect();

        self.prompt(&format!("{}\nChoose a server (number or hostname): ", menu.join("\n")))
            .await?;

        match self.next_line().await? {
            Some(answer) if !answer.trim().is_empty() => Ok(ConsoleOperator::resolve_answer(&answer, candidates)),
            _ => Err(SupervisorError::SelectionFailed {
                message: "no server chosen".to_string(),
            }),
        }
    }

    async fn read_command(&mut self) -> SupervisorResult<Option<String>> {
        if self.prompt_pending {
            self.prompt(COMMAND_PROMPT).await?;
            self.prompt_pending = false;
        }

        let line = self.next_line().await?;
        self.prompt_pending = true;
        Ok(line)
    }
}
