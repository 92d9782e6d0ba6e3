//! Running a check on a worker thread
//!
//! The engine itself is synchronous. [`run_in_background`] moves one run to
//! its own thread and hands the events back over a channel, so a UI can stay
//! responsive and read progress as it arrives.

use super::engine::CheckEngine;
use super::types::{DrcEvent, DrcReport};
use crate::board::{Board, BoardServices};
use crate::error::{DrcError, Result};
use crate::rules::CheckOptions;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle of a run executing on a worker thread
pub struct BackgroundRun {
    events: Receiver<DrcEvent>,
    handle: JoinHandle<Result<DrcReport>>,
}

impl BackgroundRun {
    /// Blocking iterator over the events; ends when the run is over
    pub fn events(&self) -> mpsc::Iter<'_, DrcEvent> {
        self.events.iter()
    }

    /// Next event if one is waiting
    pub fn try_next_event(&self) -> Option<DrcEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to end
    pub fn join(self) -> Result<DrcReport> {
        self.handle
            .join()
            .map_err(|_| DrcError::geometry("check worker thread panicked"))?
    }
}

/// Start a run on a new thread. Options are validated before the thread is
/// spawned, so configuration errors are reported right away.
pub fn run_in_background<S>(board: Arc<Board>, options: CheckOptions, services: S) -> Result<BackgroundRun>
where
    S: BoardServices + Send + 'static,
{
    let mut engine = CheckEngine::new(options)?;
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut tx = tx;
        let mut services = services;
        engine.run(&board, &mut services, &mut tx)
    });
    Ok(BackgroundRun { events: rx, handle })
}
