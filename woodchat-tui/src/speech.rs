use anyhow::{Context as _, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Reads finished bot messages aloud.
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Start speaking `text`, cutting off whatever is still being said.
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop the current utterance, if any.
    fn silence(&self);
}

/// Speaker that only records what it would have said.
#[derive(Debug, Default)]
pub struct NullSpeaker;

#[async_trait]
impl Speaker for NullSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        debug!(chars = text.chars().count(), "speech.skipped");
        Ok(())
    }

    fn silence(&self) {}
}

/// Runs an external text-to-speech program (`espeak`, `say`, ...) with the
/// text as its last argument.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: Mutex::new(None),
        }
    }

    /// Whether the last utterance is still running.
    pub fn is_speaking(&self) -> bool {
        let mut guard = match self.current.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Process id of the utterance in progress.
    pub fn current_pid(&self) -> Option<u32> {
        match self.current.lock() {
            Ok(g) => g.as_ref().and_then(Child::id),
            Err(poisoned) => poisoned.into_inner().as_ref().and_then(Child::id),
        }
    }

    fn take_current(&self) -> Option<Child> {
        match self.current.lock() {
            Ok(mut g) => g.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        self.silence();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start speech program '{}'", self.program))?;
        debug!(program = %self.program, pid = ?child.id(), "speech.start");

        let mut guard = match self.current.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(child);
        Ok(())
    }

    fn silence(&self) {
        if let Some(mut previous) = self.take_current()
            && let Err(err) = previous.start_kill()
        {
            warn!(error = %err, "speech.cancel_failed");
        }
    }
}
