//! End-to-end scripted replay through the public API

use async_trait::async_trait;
use chateval_core::{
    Agent, ChatConfig, ChatEvalError, ChatEvalResult, EpisodeOrchestrator, PersonaCorpus,
    PersonaExtractor, ScriptRequest, TurnMode, TurnRecord,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const PERSONAS: &str = "\
text:your persona: i love cats.\\npartner's persona: i am a chef.\\nhi\tepisode_done:False
text:nice\tepisode_done:True
";

/// Bot replying `r{n}` and logging what it observed
#[derive(Clone, Default)]
struct NumberingBot {
    observed: Arc<Mutex<Vec<TurnRecord>>>,
    replies: usize,
}

#[async_trait]
impl Agent for NumberingBot {
    fn id(&self) -> &str {
        "numbering"
    }

    async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
        self.replies += 1;
        Ok(TurnRecord::new("numbering", format!("r{}", self.replies), false))
    }

    async fn observe(&mut self, turn: TurnRecord) -> ChatEvalResult<()> {
        self.observed.lock().unwrap().push(turn);
        Ok(())
    }
}

/// Script mode never asks the human to type
struct AbsentHuman;

#[async_trait]
impl Agent for AbsentHuman {
    fn id(&self) -> &str {
        "localHuman"
    }

    async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
        Err(ChatEvalError::agent("localHuman", "no keyboard in script mode"))
    }

    async fn observe(&mut self, _turn: TurnRecord) -> ChatEvalResult<()> {
        Ok(())
    }
}

fn orchestrator(bot: NumberingBot) -> EpisodeOrchestrator {
    let corpus = PersonaCorpus::parse(PERSONAS).unwrap();
    EpisodeOrchestrator::new(
        Box::new(AbsentHuman),
        Box::new(bot),
        PersonaExtractor::new(Box::new(corpus)),
    )
}

fn request(temp: &TempDir, script: &str, multi: bool, multi_num: u32) -> ScriptRequest {
    let input = temp.path().join("greetings.v1.txt");
    std::fs::write(&input, script).unwrap();
    let config = ChatConfig {
        chat_script: true,
        script_input_path: Some(input),
        script_output_path: Some(temp.path().join("results")),
        chateval_multi: multi,
        chateval_multi_num: multi_num,
        model_file: "zoo:blender/blender_90M/model".to_string(),
        ..Default::default()
    };
    config.validate().unwrap();
    ScriptRequest::from_config(&config).unwrap()
}

fn output_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn pair_mode_records_one_reply_per_line() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let request = request(&temp, "hi</s>how are you\nyo</s>sup\n", true, 2);
    assert_eq!(request.mode, TurnMode::Pair);

    let bot = NumberingBot::default();
    let observed = bot.observed.clone();
    let report = orchestrator(bot)
        .run_script(&request, &CancellationToken::new())
        .await?;

    assert_eq!(report.lines, 2);
    assert_eq!(report.turns, 6);
    assert_eq!(report.recorded, 2);
    assert_eq!(output_lines(&report.output_path), vec!["r2", "r5"]);

    let file_name = report.output_path.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("greetings_blender_90M_"));
    assert!(file_name.ends_with(".txt"));

    let observed = observed.lock().unwrap();
    let sent: Vec<(&str, bool)> = observed
        .iter()
        .map(|t| (t.text(), t.episode_done()))
        .collect();
    assert_eq!(
        sent,
        vec![
            ("hi", true),
            ("how are you", false),
            ("how are you", true),
            ("yo", true),
            ("sup", false),
            ("sup", true),
            ("[DONE]", false),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn single_mode_records_every_line() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let request = request(&temp, "hello\nwhat do you cook?\nbye\n", false, 0);

    let report = orchestrator(NumberingBot::default())
        .run_script(&request, &CancellationToken::new())
        .await?;

    assert_eq!(report.turns, 3);
    assert_eq!(output_lines(&report.output_path), vec!["r1", "r2", "r3"]);
    Ok(())
}

#[tokio::test]
async fn triple_mode_records_only_the_final_utterance() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let request = request(&temp, "a</s>b<\\s>`c`\nd</s>e<\\s>f\n", true, 3);

    let report = orchestrator(NumberingBot::default())
        .run_script(&request, &CancellationToken::new())
        .await?;

    assert_eq!(report.lines, 2);
    assert_eq!(report.turns, 10);
    assert_eq!(report.recorded, 2);
    assert_eq!(output_lines(&report.output_path), vec!["r4", "r9"]);
    Ok(())
}

#[tokio::test]
async fn malformed_line_keeps_earlier_replies() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let request = request(&temp, "hi</s>there\nno delimiter here\n", true, 2);
    let results = temp.path().join("results");

    let err = orchestrator(NumberingBot::default())
        .run_script(&request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ChatEvalError::MalformedTranscript { line: 2, .. }));

    let files: Vec<_> = std::fs::read_dir(&results)?.collect::<Result<_, _>>()?;
    assert_eq!(files.len(), 1);
    assert_eq!(output_lines(&files[0].path()), vec!["r2"]);
    Ok(())
}

#[tokio::test]
async fn done_line_in_transcript_reaches_the_bot() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let request = request(&temp, "hi\n[DONE]\n", false, 0);

    let bot = NumberingBot::default();
    let observed = bot.observed.clone();
    let report = orchestrator(bot)
        .run_script(&request, &CancellationToken::new())
        .await?;

    assert_eq!(report.recorded, 2);
    assert_eq!(output_lines(&report.output_path), vec!["r1", "r2"]);

    // the line, then the end-of-script notice from the default `finish`
    let observed = observed.lock().unwrap();
    let texts: Vec<&str> = observed.iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["hi", "[DONE]", "[DONE]"]);
    Ok(())
}
