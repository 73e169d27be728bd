//! Interactive chat loop

use tracing::{debug, info};

use super::{CancellationToken, EpisodeOrchestrator};
use crate::error::{ChatEvalError, ChatEvalResult};

/// Summary of an interactive session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractiveReport {
    /// Episodes that reached an episode-done exchange
    pub episodes: usize,
    /// Exchanges across all episodes
    pub turns: usize,
}

impl EpisodeOrchestrator {
    /// Chat until `cancel` fires or the human stops the session
    ///
    /// The human ending input (its `act` returning
    /// [`ChatEvalError::Cancelled`]) is a normal exit. Any other agent error
    /// ends the session with that error.
    pub async fn run_interactive(
        &mut self,
        cancel: &CancellationToken,
    ) -> ChatEvalResult<InteractiveReport> {
        info!("Starting interactive chat with '{}'", self.bot.id());

        loop {
            if cancel.is_cancelled() {
                debug!("Interactive chat cancelled");
                break;
            }

            match self.interactive_turn(cancel).await {
                Ok(()) => {}
                Err(ChatEvalError::Cancelled) => break,
                Err(e) => return Err(e),
            }
        }

        let report = InteractiveReport {
            episodes: self.state.episodes(),
            turns: self.state.total_turns(),
        };
        info!(
            "Interactive chat finished after {} episodes, {} turns",
            report.episodes, report.turns
        );
        Ok(report)
    }

    async fn interactive_turn(&mut self, cancel: &CancellationToken) -> ChatEvalResult<()> {
        if self.state.needs_persona() {
            self.assign_persona().await?;
        }

        let human_turn = tokio::select! {
            _ = cancel.cancelled() => return Err(ChatEvalError::Cancelled),
            turn = self.human.act() => turn?,
        };

        let human_turn = if self.state.is_first_turn() {
            let preamble = self
                .state
                .persona()
                .map(|p| p.preamble().to_string())
                .unwrap_or_default();
            human_turn.with_prefix(&preamble)
        } else {
            human_turn
        };

        self.exchange(human_turn).await?;

        if self.state.episode_done() {
            let episode = self.state.episodes() + 1;
            if let Some(persona) = self.state.finish_episode() {
                self.observer.episode_finished(&persona).await;
            }
            info!("Episode {} finished", episode);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, ChatObserver};
    use crate::persona::{Persona, PersonaCorpus, PersonaExtractor};
    use crate::turn::{LOCAL_HUMAN_ID, TurnRecord};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const CORPUS: &str = "\
text:your persona: i like jazz.\\nhi\tepisode_done:False
text:bye\tepisode_done:True
text:your persona: i grow tomatoes.\\nhello\tepisode_done:False
text:later\tepisode_done:True
";

    /// Human that types a fixed list of lines, then stops
    struct TypedHuman {
        lines: VecDeque<(&'static str, bool)>,
        cancel_when_empty: Option<CancellationToken>,
    }

    #[async_trait]
    impl Agent for TypedHuman {
        fn id(&self) -> &str {
            LOCAL_HUMAN_ID
        }

        async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
            match self.lines.pop_front() {
                Some((text, done)) => Ok(TurnRecord::new(LOCAL_HUMAN_ID, text, done)),
                None => {
                    if let Some(token) = &self.cancel_when_empty {
                        token.cancel();
                        std::future::pending::<()>().await;
                    }
                    Err(ChatEvalError::Cancelled)
                }
            }
        }

        async fn observe(&mut self, _turn: TurnRecord) -> ChatEvalResult<()> {
            Ok(())
        }
    }

    /// Bot that echoes and keeps everything it saw
    #[derive(Clone, Default)]
    struct EchoBot {
        seen: Arc<Mutex<Vec<TurnRecord>>>,
        last: Option<String>,
    }

    #[async_trait]
    impl Agent for EchoBot {
        fn id(&self) -> &str {
            "echo"
        }

        async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
            let text = self.last.take().unwrap_or_default();
            Ok(TurnRecord::new("echo", format!("echo: {}", text), false))
        }

        async fn observe(&mut self, turn: TurnRecord) -> ChatEvalResult<()> {
            self.last = Some(turn.text().to_string());
            self.seen.lock().unwrap().push(turn);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct EventLog {
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatObserver for EventLog {
        async fn persona_assigned(&mut self, persona: &Persona) {
            self.events
                .lock()
                .unwrap()
                .push(format!("persona {}", persona.preamble().trim_end()));
        }

        async fn exchange(&mut self, human: &TurnRecord, reply: &TurnRecord) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{} -> {}", human.text(), reply.text()));
        }

        async fn episode_finished(&mut self, persona: &Persona) {
            self.events
                .lock()
                .unwrap()
                .push(format!("retired {}", persona.preamble().trim_end()));
        }
    }

    fn orchestrator(lines: Vec<(&'static str, bool)>, bot: EchoBot) -> EpisodeOrchestrator {
        let human = TypedHuman {
            lines: lines.into(),
            cancel_when_empty: None,
        };
        let corpus = PersonaCorpus::parse(CORPUS).unwrap();
        EpisodeOrchestrator::new(
            Box::new(human),
            Box::new(bot),
            PersonaExtractor::new(Box::new(corpus)),
        )
    }

    #[tokio::test]
    async fn test_persona_prefixed_once_per_episode() {
        let bot = EchoBot::default();
        let seen = bot.seen.clone();
        let mut orch = orchestrator(
            vec![("hi there", false), ("how are you", false), ("bye", true), ("again", false)],
            bot,
        );

        let report = orch.run_interactive(&CancellationToken::new()).await.unwrap();
        assert_eq!(report.episodes, 1);
        assert_eq!(report.turns, 4);

        let seen = seen.lock().unwrap();
        let texts: Vec<&str> = seen.iter().map(|t| t.text()).collect();
        assert_eq!(
            texts,
            vec![
                "your persona: i grow tomatoes.\nhi there",
                "how are you",
                "bye",
                "your persona: i like jazz.\nagain",
            ]
        );
    }

    #[tokio::test]
    async fn test_observer_sees_episode_lifecycle() {
        let log = EventLog::default();
        let events = log.events.clone();
        let mut orch = orchestrator(vec![("hello", false), ("[DONE]", true)], EchoBot::default())
            .with_observer(Box::new(log))
            .with_display_examples(true);

        orch.run_interactive(&CancellationToken::new()).await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "persona your persona: i grow tomatoes.".to_string(),
                "your persona: i grow tomatoes.\nhello -> echo: your persona: i grow tomatoes.\nhello"
                    .to_string(),
                "[DONE] -> echo: [DONE]".to_string(),
                "retired your persona: i grow tomatoes.".to_string(),
                "persona your persona: i like jazz.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_before_start_runs_no_turns() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut orch = orchestrator(vec![("hello", false)], EchoBot::default());

        let report = orch.run_interactive(&cancel).await.unwrap();
        assert_eq!(report, InteractiveReport::default());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_human() {
        let cancel = CancellationToken::new();
        let human = TypedHuman {
            lines: vec![("one", false)].into(),
            cancel_when_empty: Some(cancel.clone()),
        };
        let corpus = PersonaCorpus::parse(CORPUS).unwrap();
        let mut orch = EpisodeOrchestrator::new(
            Box::new(human),
            Box::new(EchoBot::default()),
            PersonaExtractor::new(Box::new(corpus)),
        );

        let report = orch.run_interactive(&cancel).await.unwrap();
        assert_eq!(report.turns, 1);
    }

    #[tokio::test]
    async fn test_bot_failure_propagates() {
        struct BrokenBot;

        #[async_trait]
        impl Agent for BrokenBot {
            fn id(&self) -> &str {
                "broken"
            }

            async fn act(&mut self) -> ChatEvalResult<TurnRecord> {
                Err(ChatEvalError::agent("broken", "model crashed"))
            }

            async fn observe(&mut self, _turn: TurnRecord) -> ChatEvalResult<()> {
                Ok(())
            }
        }

        let human = TypedHuman {
            lines: vec![("hi", false)].into(),
            cancel_when_empty: None,
        };
        let corpus = PersonaCorpus::parse(CORPUS).unwrap();
        let mut orch = EpisodeOrchestrator::new(
            Box::new(human),
            Box::new(BrokenBot),
            PersonaExtractor::new(Box::new(corpus)),
        );

        let err = orch.run_interactive(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ChatEvalError::Agent { .. }));
    }
}
