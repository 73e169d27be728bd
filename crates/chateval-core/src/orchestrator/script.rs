//! Scripted batch replay
//!
//! A run opens the transcript and the result file, assigns one persona,
//! replays every line under the configured [`TurnMode`], closes the result
//! file and finally tells the bot the script is over through
//! [`Agent::finish`](crate::agent::Agent::finish).

use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info, warn};

use super::{CancellationToken, EpisodeOrchestrator};
use crate::config::ChatConfig;
use crate::error::{ChatEvalError, ChatEvalResult};
use crate::replay::{OutputSink, TurnMode, output_path, split_turns};
use crate::turn::{LOCAL_HUMAN_ID, TurnRecord};

/// What to replay and where to put the results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    /// Transcript to replay
    pub input: PathBuf,
    /// Directory receiving the result file
    pub output_dir: PathBuf,
    /// Model identifier used in the result file name
    pub model_file: String,
    /// Sub-turns per transcript line
    pub mode: TurnMode,
}

impl ScriptRequest {
    /// Build a request from a validated config
    pub fn from_config(config: &ChatConfig) -> ChatEvalResult<Self> {
        let paths = config.script_paths()?;
        Ok(Self {
            input: paths.input,
            output_dir: paths.output_dir,
            model_file: config.model_file.clone(),
            mode: config.turn_mode()?,
        })
    }
}

/// Summary of a finished replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    /// Result file that received the recorded replies
    pub output_path: PathBuf,
    /// Transcript lines replayed
    pub lines: usize,
    /// Agent turns executed
    pub turns: usize,
    /// Replies written to the result file
    pub recorded: usize,
}

#[derive(Debug, Default)]
struct ReplayProgress {
    lines: usize,
    recorded: usize,
}

impl EpisodeOrchestrator {
    /// Replay a transcript and record the selected replies
    ///
    /// The result file is closed on every exit path. On success the bot's
    /// `finish` hook runs once; no reply is requested.
    pub async fn run_script(
        &mut self,
        request: &ScriptRequest,
        cancel: &CancellationToken,
    ) -> ChatEvalResult<ScriptReport> {
        let mut lines = open_transcript(&request.input).await?;
        let base = output_path(
            &request.output_dir,
            &request.model_file,
            &request.input,
            &Local::now(),
        );
        let mut sink = OutputSink::create(&base).await?;
        info!(
            "Replaying {} ({}) into {}",
            request.input.display(),
            request.mode,
            sink.path().display()
        );

        let mut progress = ReplayProgress::default();
        let outcome = self
            .replay(&mut lines, &mut sink, request.mode, cancel, &mut progress)
            .await;

        let closed = sink.close().await;
        let output_path = match (outcome, closed) {
            (Ok(()), Ok(path)) => path,
            (Ok(()), Err(close_err)) => return Err(close_err),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!("Failed to close result file after error: {}", close_err);
                }
                return Err(e);
            }
        };

        self.bot.finish().await?;

        let report = ScriptReport {
            output_path,
            lines: progress.lines,
            turns: self.state.total_turns(),
            recorded: progress.recorded,
        };
        info!(
            "Script response complete: {} lines, {} turns, {} replies recorded in {}",
            report.lines,
            report.turns,
            report.recorded,
            report.output_path.display()
        );
        Ok(report)
    }

    async fn replay(
        &mut self,
        lines: &mut Lines<BufReader<File>>,
        sink: &mut OutputSink,
        mode: TurnMode,
        cancel: &CancellationToken,
        progress: &mut ReplayProgress,
    ) -> ChatEvalResult<()> {
        self.assign_persona().await?;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ChatEvalError::io("reading transcript", e))?
        {
            if cancel.is_cancelled() {
                return Err(ChatEvalError::Cancelled);
            }

            let line_no = progress.lines + 1;
            let sub_turns = split_turns(&line, mode, line_no)?;
            debug!("Line {}: {} sub-turns", line_no, sub_turns.len());

            for (position, text) in sub_turns.iter().enumerate() {
                for dispatch in mode.sends_for(position) {
                    let human_turn = TurnRecord::new(LOCAL_HUMAN_ID, text, dispatch.episode_done);
                    let reply = self.exchange(human_turn).await?;

                    if dispatch.recorded {
                        sink.write_line(reply.text()).await?;
                        progress.recorded += 1;
                        self.observer.reply_recorded(line_no, reply.text()).await;
                    }
                }
            }
            progress.lines = line_no;
        }
        Ok(())
    }
}

async fn open_transcript(path: &Path) -> ChatEvalResult<Lines<BufReader<File>>> {
    let file = File::open(path).await.map_err(|e| {
        ChatEvalError::config(format!(
            "cannot open script input {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(BufReader::new(file).lines())
}
