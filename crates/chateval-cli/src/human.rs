//! Keyboard-driven human agent

use async_trait::async_trait;
use chateval_core::{Agent, ChatEvalError, ChatEvalResult, DONE_SENTINEL, LOCAL_HUMAN_ID, TurnRecord};
use colored::*;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Typing this quits the session
pub const EXIT_MARKER: &str = "[EXIT]";

const PROMPT: &str = "Enter Your Message: ";

/// What one typed line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
enum HumanInput {
    Message { text: String, episode_done: bool },
    Exit,
}

fn parse_input(raw: &str) -> HumanInput {
    let text = raw.replace("\\n", "\n");
    if text.contains(EXIT_MARKER) {
        return HumanInput::Exit;
    }
    let episode_done = text.contains(DONE_SENTINEL);
    let text = text.replace(DONE_SENTINEL, "");
    HumanInput::Message {
        text: text.trim().to_string(),
        episode_done,
    }
}

/// Human that types turns on stdin and reads replies on stdout
pub struct LocalHuman<R = BufReader<Stdin>> {
    lines: Lines<R>,
    echo_replies: bool,
    episode_done: bool,
}

impl LocalHuman {
    /// Read turns from the process's stdin
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> LocalHuman<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            echo_replies: true,
            episode_done: false,
        }
    }

    /// Print observed replies
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_replies = echo;
        self
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Agent for LocalHuman<R> {
    fn id(&self) -> &str {
        LOCAL_HUMAN_ID
    }

    async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
        print!("{}", PROMPT.bold());
        std::io::stdout().flush()?;

        let raw = self
            .lines
            .next_line()
            .await
            .map_err(|e| ChatEvalError::io("reading keyboard input", e))?;

        match raw.as_deref().map(parse_input) {
            None | Some(HumanInput::Exit) => Err(ChatEvalError::Cancelled),
            Some(HumanInput::Message { text, episode_done }) => {
                self.episode_done = episode_done;
                Ok(TurnRecord::new(LOCAL_HUMAN_ID, text, episode_done))
            }
        }
    }

    async fn observe(&mut self, turn: TurnRecord) -> ChatEvalResult<()> {
        if self.echo_replies {
            println!("[{}]: {}", turn.speaker_id().green(), turn.text());
        }
        Ok(())
    }

    fn episode_done(&self) -> bool {
        self.episode_done
    }
}
