//! Best-effort math typesetting.
//!
//! After the visible records or their expansion change, the rendered text is
//! handed to an external typesetting engine. The pass runs detached: its
//! failure, or the engine being absent, is logged and the raw `\(..\)` and
//! `\[..\]` delimiters simply stay visible.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::state::{render_visible, DisplayState};

/// Errors from a typesetting pass
#[derive(Debug, thiserror::Error)]
pub enum TypesetError {
    /// The engine is not installed or could not be started
    #[error("Typesetting engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran and reported failure
    #[error("Typesetting failed: {0}")]
    Failed(String),
}

/// An external engine that typesets math in rendered text.
#[async_trait]
pub trait Typesetter: Send + Sync + std::fmt::Debug {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Typeset the given fragments
    async fn typeset(&self, fragments: &[String]) -> Result<(), TypesetError>;
}

/// Runs an external program, writing one fragment per line to its stdin.
#[derive(Debug, Clone)]
pub struct CommandTypesetter {
    program: String,
    args: Vec<String>,
}

impl CommandTypesetter {
    /// Create a typesetter for `program args..`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Typesetter for CommandTypesetter {
    fn name(&self) -> &str {
        &self.program
    }

    async fn typeset(&self, fragments: &[String]) -> Result<(), TypesetError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TypesetError::Unavailable(format!("{}: {}", self.program, e)))?;

        // Feed stdin concurrently with draining stdout and stderr.
        let stdin = child.stdin.take();
        let input = fragments.join("\n");
        let feed = async move {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    // The engine may exit without reading; its status decides.
                    if e.kind() != ErrorKind::BrokenPipe {
                        return Err(e);
                    }
                }
            }
            Ok(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| TypesetError::Failed(e.to_string()))?;
        fed.map_err(|e| TypesetError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TypesetError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// What a typesetting pass depends on
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    visible: Vec<String>,
    expanded: Vec<usize>,
}

impl Fingerprint {
    fn of(state: &DisplayState) -> Self {
        Self {
            visible: state
                .visible_records()
                .iter()
                .map(|r| r.id().to_string())
                .collect(),
            expanded: state.expanded_indices(),
        }
    }
}

/// Fires a typesetting pass whenever the visible records or expansion change.
#[derive(Debug, Default)]
pub struct TypesetTrigger {
    engine: Option<Arc<dyn Typesetter>>,
    last: Option<Fingerprint>,
}

impl TypesetTrigger {
    /// Create a trigger; `None` means no engine is available
    pub fn new(engine: Option<Arc<dyn Typesetter>>) -> Self {
        Self { engine, last: None }
    }

    /// Observe the current state and start a pass if it changed.
    ///
    /// Returns the handle of the spawned pass, if one was started. The task
    /// never fails; callers may await it or drop it. Must be called from
    /// within a Tokio runtime.
    pub fn observe(&mut self, state: &DisplayState) -> Option<JoinHandle<()>> {
        let fingerprint = Fingerprint::of(state);
        if self.last.as_ref() == Some(&fingerprint) {
            return None;
        }
        self.last = Some(fingerprint);

        let fragments: Vec<String> = render_visible(state)
            .iter()
            .flat_map(|r| r.math_fragments())
            .collect();
        if fragments.is_empty() {
            return None;
        }

        let Some(engine) = self.engine.clone() else {
            tracing::debug!("No typesetting engine configured, leaving raw delimiters");
            return None;
        };

        Some(tokio::spawn(async move {
            match engine.typeset(&fragments).await {
                Ok(()) => tracing::debug!("Typeset {} fragments with {}", fragments.len(), engine.name()),
                Err(e) => tracing::warn!("Error rendering math: {}", e),
            }
        }))
    }
}

/// Wait for a pass started by [`TypesetTrigger::observe`].
///
/// Returns `false` if the pass task panicked or was cancelled; that is logged,
/// never propagated.
pub async fn wait_for_pass(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Error rendering math: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublicationRecordBuilder;
    use crate::state::DisplayConfig;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingTypesetter {
        passes: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl Typesetter for RecordingTypesetter {
        fn name(&self) -> &str {
            "recording"
        }

        async fn typeset(&self, fragments: &[String]) -> Result<(), TypesetError> {
            self.passes.lock().unwrap().push(fragments.to_vec());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct BrokenTypesetter;

    #[async_trait]
    impl Typesetter for BrokenTypesetter {
        fn name(&self) -> &str {
            "broken"
        }

        async fn typeset(&self, _fragments: &[String]) -> Result<(), TypesetError> {
            Err(TypesetError::Failed("engine crashed".to_string()))
        }
    }

    #[derive(Debug)]
    struct PanickingTypesetter;

    #[async_trait]
    impl Typesetter for PanickingTypesetter {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn typeset(&self, _fragments: &[String]) -> Result<(), TypesetError> {
            panic!("engine bug");
        }
    }

    fn ready_state() -> DisplayState {
        let records = (0..5)
            .map(|i| {
                PublicationRecordBuilder::new(i.to_string(), format!("$x_{}$", i), "https://x")
                    .abstract_text(Some("$y$".to_string()))
                    .build()
            })
            .collect();
        DisplayState::new(DisplayConfig::default()).fetch_succeeded(records)
    }

    #[tokio::test]
    async fn test_fires_only_on_change() {
        let engine = Arc::new(RecordingTypesetter::default());
        let mut trigger = TypesetTrigger::new(Some(engine.clone() as Arc<dyn Typesetter>));

        let state = ready_state();
        trigger.observe(&state).unwrap().await.unwrap();
        assert!(trigger.observe(&state).is_none());

        let state = state.toggle_abstract(1);
        trigger.observe(&state).unwrap().await.unwrap();

        let state = state.toggle_show_all();
        trigger.observe(&state).unwrap().await.unwrap();

        let passes = engine.passes.lock().unwrap();
        assert_eq!(passes.len(), 3);
        assert_eq!(passes[0], vec![r"\(x_0\)", r"\(x_1\)", r"\(x_2\)"]);
        assert_eq!(passes[1].len(), 4);
        assert!(passes[1].contains(&r"\(y\)".to_string()));
        assert_eq!(passes[2].len(), 6);
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let mut trigger = TypesetTrigger::new(Some(Arc::new(BrokenTypesetter) as Arc<dyn Typesetter>));
        let handle = trigger.observe(&ready_state()).unwrap();
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_panicking_pass_is_contained() {
        let mut trigger =
            TypesetTrigger::new(Some(Arc::new(PanickingTypesetter) as Arc<dyn Typesetter>));
        let handle = trigger.observe(&ready_state()).unwrap();
        assert!(!wait_for_pass(handle).await);
    }

    #[tokio::test]
    async fn test_wait_for_completed_pass() {
        let engine = Arc::new(RecordingTypesetter::default());
        let mut trigger = TypesetTrigger::new(Some(engine.clone() as Arc<dyn Typesetter>));
        let handle = trigger.observe(&ready_state()).unwrap();
        assert!(wait_for_pass(handle).await);
        assert_eq!(engine.passes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_engine_is_noop() {
        let mut trigger = TypesetTrigger::new(None);
        assert!(trigger.observe(&ready_state()).is_none());
    }

    #[tokio::test]
    async fn test_loading_state_has_nothing_to_typeset() {
        let engine = Arc::new(RecordingTypesetter::default());
        let mut trigger = TypesetTrigger::new(Some(engine.clone() as Arc<dyn Typesetter>));
        assert!(trigger
            .observe(&DisplayState::new(DisplayConfig::default()))
            .is_none());
        assert!(engine.passes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let engine = CommandTypesetter::new("definitely-not-a-typesetter-binary", vec![]);
        let result = engine.typeset(&["\\(x\\)".to_string()]).await;
        assert!(matches!(result, Err(TypesetError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_exit_status() {
        let ok = CommandTypesetter::new("cat", vec![]);
        assert!(ok.typeset(&["\\(x\\)".to_string()]).await.is_ok());

        let failing = CommandTypesetter::new("false", vec![]);
        assert!(matches!(
            failing.typeset(&["\\(x\\)".to_string()]).await,
            Err(TypesetError::Failed(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_drains_stderr_while_feeding_stdin() {
        // Fills the stderr pipe before reading any input.
        let engine = CommandTypesetter::new(
            "sh",
            vec![
                "-c".to_string(),
                "head -c 262144 /dev/zero >&2; cat >/dev/null".to_string(),
            ],
        );
        let fragments = vec!["\\(x\\)".repeat(65536)];

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            engine.typeset(&fragments),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
