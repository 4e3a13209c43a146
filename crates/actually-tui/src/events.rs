//! UI event types.
//!
//! Everything the reducer reacts to: terminal input, timer ticks, and results
//! sent back by spawned effects through the runtime inbox.

use crossterm::event::Event as CrosstermEvent;

use crate::code_block::BlockKey;
use crate::common::TaskId;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Animation tick.
    Tick,
    /// Current terminal size, sent before each batch of events.
    Frame { width: u16, height: u16 },
    Terminal(CrosstermEvent),
    /// A completion request finished. Errors arrive as display text.
    CompletionFinished {
        task: TaskId,
        result: Result<String, String>,
    },
    /// A code block's copy feedback window elapsed.
    CopyResetElapsed { block: BlockKey, generation: u64 },
}
