//! Effect execution: the only place where the TUI performs I/O.
//!
//! Async work is spawned on the ambient tokio runtime and reports back through
//! the inbox. Cancellation tokens come from the reducer; this module only
//! races them against the work.

use std::future::Future;
use std::sync::Arc;

use actually_core::api::CompletionClient;
use actually_core::storage::Preferences;
use tokio::sync::mpsc;

use crate::clipboard::ClipboardSink;
use crate::code_block::COPY_RESET_DELAY;
use crate::effects::UiEffect;
use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

pub struct Executor {
    inbox_tx: UiEventSender,
    client: CompletionClient,
    prefs: Preferences,
    clipboard: Arc<dyn ClipboardSink>,
}

impl Executor {
    pub fn new(
        inbox_tx: UiEventSender,
        client: CompletionClient,
        prefs: Preferences,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Self {
        Self {
            inbox_tx,
            client,
            prefs,
            clipboard,
        }
    }

    pub fn execute_all(&self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    pub fn execute(&self, effect: UiEffect) {
        match effect {
            UiEffect::SubmitPrompt {
                task,
                credential,
                prompt,
                cancel,
            } => {
                let client = self.client.clone();
                let sink_tx = self.inbox_tx.clone();
                self.spawn_effect(async move {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            tracing::info!(task = task.0, "completion request cancelled");
                            None
                        }
                        result = client.submit(&credential, &prompt, move |text| {
                            let _ = sink_tx.send(UiEvent::CompletionFinished {
                                task,
                                result: Ok(text),
                            });
                        }) => match result {
                            Ok(()) => None,
                            Err(err) => {
                                tracing::warn!(error = %err, "completion request failed");
                                Some(UiEvent::CompletionFinished {
                                    task,
                                    result: Err(err.to_string()),
                                })
                            }
                        },
                    }
                });
            }

            UiEffect::PersistCredential { credential } => {
                if !self.prefs.set_credential(&credential) {
                    tracing::warn!("API key was not persisted");
                }
            }
            UiEffect::PersistShowCredential { show } => {
                if !self.prefs.set_show_credential(show) {
                    tracing::warn!("show API key preference was not persisted");
                }
            }

            UiEffect::CopyToClipboard { text } => {
                if let Err(err) = self.clipboard.write(&text) {
                    tracing::warn!(error = %err, "clipboard write failed");
                }
            }
            UiEffect::ScheduleCopyReset {
                block,
                generation,
                cancel,
            } => {
                self.spawn_effect(async move {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => None,
                        () = tokio::time::sleep(COPY_RESET_DELAY) => {
                            Some(UiEvent::CopyResetElapsed { block, generation })
                        }
                    }
                });
            }

            UiEffect::CancelTask { token } => token.cancel(),
        }
    }

    /// Spawns `fut` and forwards its event, if any, to the inbox.
    fn spawn_effect<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = Option<UiEvent>> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            if let Some(event) = fut.await {
                let _ = tx.send(event);
            }
        });
    }
}
