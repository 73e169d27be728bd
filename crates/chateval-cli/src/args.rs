//! CLI argument definitions using clap
//!
//! - chateval                                   # Chat interactively
//! - chateval --script-chateval --chateval-input-path in.txt --chateval-output-path out/
//! - chateval --script-chateval --chateval-multi --chateval-multi-num 3 ...

use chateval_core::config::{ChatConfig, DEFAULT_CONFIG_FILE};
use chateval_core::ChatEvalResult;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chateval")]
#[command(about = "ChatEval - chat with a persona-conditioned bot or replay scripted transcripts")]
#[command(
    long_about = r#"ChatEval - chat with a persona-conditioned bot or replay scripted transcripts

USAGE:
  chateval --persona-corpus personas.txt          # Interactive chat
  chateval --persona-corpus personas.txt \
      --script-chateval \
      --chateval-input-path script.txt \
      --chateval-output-path results/           # Replay one utterance per line
  chateval ... --chateval-multi --chateval-multi-num 2
                                                  # Replay `a</s>b` pairs per line

Enter [DONE] during a chat to get a new partner, [EXIT] to quit."#
)]
#[command(version)]
pub struct Cli {
    /// Print every exchange
    #[arg(short = 'd', long)]
    pub display_examples: bool,

    /// Replay a transcript file instead of chatting
    #[arg(long = "script-chateval", alias = "sc")]
    pub script_chateval: bool,

    /// Transcript to replay
    #[arg(long = "chateval-input-path", alias = "scip")]
    pub chateval_input_path: Option<PathBuf>,

    /// Directory receiving the result file
    #[arg(long = "chateval-output-path", alias = "scop")]
    pub chateval_output_path: Option<PathBuf>,

    /// Group several sub-turns per transcript line
    #[arg(long = "chateval-multi")]
    pub chateval_multi: bool,

    /// Sub-turns per transcript line with --chateval-multi (2 or 3)
    #[arg(long = "chateval-multi-num")]
    pub chateval_multi_num: Option<u32>,

    /// Model identifier, also used to name result files
    #[arg(short = 'm', long = "model-file")]
    pub model_file: Option<String>,

    /// ParlAI-format persona corpus
    #[arg(long = "persona-corpus")]
    pub persona_corpus: Option<PathBuf>,

    /// Path to configuration file [default: chateval.json, then ~/.chateval/config.json]
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Load the named config file, which must exist, or the default chain
    pub fn load_config(&self) -> ChatEvalResult<ChatConfig> {
        match &self.config_file {
            Some(path) => ChatConfig::load_explicit(path),
            None => ChatConfig::load(DEFAULT_CONFIG_FILE),
        }
    }

    /// Layer the command-line flags over a loaded config
    pub fn apply_to(&self, config: &mut ChatConfig) {
        config.display_examples |= self.display_examples;
        config.chat_script |= self.script_chateval;
        config.chateval_multi |= self.chateval_multi;

        if let Some(path) = &self.chateval_input_path {
            config.script_input_path = Some(path.clone());
        }
        if let Some(path) = &self.chateval_output_path {
            config.script_output_path = Some(path.clone());
        }
        if let Some(num) = self.chateval_multi_num {
            config.chateval_multi_num = num;
        }
        if let Some(model) = &self.model_file {
            config.model_file = model.clone();
        }
        if let Some(corpus) = &self.persona_corpus {
            config.persona_corpus_path = Some(corpus.clone());
        }
    }
}
