//! Ctrl+C handling
//!
//! SIGINT cancels the run's [`CancellationToken`]; the orchestrator stops at
//! its next turn boundary and closes any open result file. A second SIGINT
//! exits immediately.

use futures::stream::StreamExt;
use signal_hook::consts::SIGINT;
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Signal listener bound to one cancellation token
pub struct SignalHandler {
    handle: Handle,
    task_handle: Option<JoinHandle<()>>,
}

impl SignalHandler {
    /// Start listening for SIGINT
    pub fn start(cancel: CancellationToken) -> std::io::Result<Self> {
        let mut signals = Signals::new([SIGINT])?;
        let handle = signals.handle();

        let task_handle = tokio::spawn(async move {
            while let Some(signal) = signals.next().await {
                if signal != SIGINT {
                    continue;
                }
                if cancel.is_cancelled() {
                    eprintln!("\nGoodbye!");
                    std::process::exit(130);
                }
                eprintln!("\n🛑 Interrupting... (Ctrl+C again to quit now)");
                cancel.cancel();
            }
        });

        Ok(Self {
            handle,
            task_handle: Some(task_handle),
        })
    }

    /// Stop listening
    pub async fn stop(mut self) {
        self.handle.close();
        if let Some(task) = self.task_handle.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SignalHandler {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(task) = self.task_handle.take() {
            task.abort();
        }
    }
}
