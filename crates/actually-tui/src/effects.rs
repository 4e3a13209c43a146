//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer creates every cancellation token it hands out. The runtime
//! only calls `cancel()` on them.

use tokio_util::sync::CancellationToken;

use crate::code_block::BlockKey;
use crate::common::TaskId;

#[derive(Debug)]
pub enum UiEffect {
    /// Send the prompt to the completion API.
    SubmitPrompt {
        task: TaskId,
        credential: String,
        prompt: String,
        cancel: CancellationToken,
    },

    /// Store the credential.
    PersistCredential { credential: String },

    /// Store the "show credential" preference.
    PersistShowCredential { show: bool },

    /// Write text to the system clipboard.
    CopyToClipboard { text: String },

    /// Emit `CopyResetElapsed` after the copy feedback delay unless cancelled.
    ScheduleCopyReset {
        block: BlockKey,
        generation: u64,
        cancel: CancellationToken,
    },

    /// Cancel an in-flight request or a pending reset.
    CancelTask { token: CancellationToken },
}
