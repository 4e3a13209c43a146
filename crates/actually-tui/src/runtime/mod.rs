//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the "Elm runtime" boundary. The reducer stays pure and returns
//! effects; [`executor::Executor`] performs them. Spawned work reports back
//! through the inbox channel, which is drained once per loop iteration.

mod executor;

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event;
pub use executor::{Executor, UiEventReceiver, UiEventSender};

use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::TerminalSession;
use crate::{render, update};

/// Frame cadence while a request is pending (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle. Longer timeout reduces CPU usage.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct TuiRuntime {
    session: TerminalSession,
    pub state: AppState,
    executor: Executor,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Enters the terminal UI. The inbox sender must be the one given to
    /// `executor`.
    ///
    /// # Errors
    /// Returns an error if terminal setup fails.
    pub fn new(state: AppState, executor: Executor, inbox_rx: UiEventReceiver) -> Result<Self> {
        let session = TerminalSession::enter()?;
        Ok(Self {
            session,
            state,
            executor,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs until the user quits.
    ///
    /// # Errors
    /// Returns an error if reading terminal input or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            let size = self.session.terminal().size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                // The Frame event alone does not warrant a redraw.
                if !matches!(event, UiEvent::Frame { .. }) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.executor.execute_all(effects);
            }

            if dirty {
                let state = &self.state;
                self.session.terminal().draw(|frame| render::render(state, frame))?;
                dirty = false;
            }
        }

        tracing::info!("interactive session ended");
        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        while let Ok(event) = self.inbox_rx.try_recv() {
            events.push(event);
        }

        let tick_interval = if self.state.is_waiting() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            // Idle ticks change nothing on screen.
            if self.state.is_waiting() {
                events.push(UiEvent::Tick);
            }
            self.last_tick = Instant::now();
        }

        Ok(events)
    }
}
