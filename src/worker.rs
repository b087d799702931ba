use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::{debug, error, info};

use crate::error::SearchError;
use crate::root::choose_move;
use crate::rules::Rules;
use crate::search::SearchState;
use crate::types::SearchResult;

pub type Outcome<M> = Result<SearchResult<M>, SearchError>;

/// A root search running on its own thread.
///
/// The worker owns its position snapshot; nothing it touches is visible to
/// the caller until the result arrives.
pub struct SearchHandle<M> {
    stop: Arc<AtomicBool>,
    in_progress: Arc<AtomicBool>,
    rx: Receiver<Outcome<M>>,
    thread: Option<JoinHandle<()>>,
}

/// Runs `choose_move` on a worker thread.
pub fn spawn<R>(rules: R, pos: R::Position, depth: u8) -> SearchHandle<R::Move>
where
    R: Rules + Send + 'static,
    R::Position: Send + 'static,
    R::Move: Send + 'static,
{
    spawn_with(rules, pos, depth, |_| {})
}

/// Like [`spawn`], calling `on_done` on the worker thread with the outcome
/// before it is handed to the channel.
pub fn spawn_with<R, F>(rules: R, pos: R::Position, depth: u8, on_done: F) -> SearchHandle<R::Move>
where
    R: Rules + Send + 'static,
    R::Position: Send + 'static,
    R::Move: Send + 'static,
    F: FnOnce(&Outcome<R::Move>) + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let in_progress = Arc::new(AtomicBool::new(true));
    let (tx, rx) = bounded(1);

    let mut state = SearchState::with_stop(stop.clone());
    let flag = in_progress.clone();

    debug!(depth, "spawning search worker");
    let thread = thread::spawn(move || {
        let outcome = choose_move(&rules, &mut state, &pos, depth);
        on_done(&outcome);
        flag.store(false, Ordering::SeqCst);
        // Receiver may already be gone; nobody is waiting then.
        let _ = tx.send(outcome);
    });

    SearchHandle {
        stop,
        in_progress,
        rx,
        thread: Some(thread),
    }
}

impl<M> SearchHandle<M> {
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Asks the worker to stop at the next node boundary. The outcome will
    /// be `Err(SearchError::Cancelled)` unless the search already finished.
    pub fn cancel(&self) {
        info!("cancelling search");
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Non-blocking poll for the outcome. Yields it once; later polls return
    /// `None`.
    pub fn try_result(&mut self) -> Option<Outcome<M>> {
        if self.thread.is_none() {
            return None;
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                let _ = self.join();
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            // Sender gone without a message: the worker died mid-search.
            Err(TryRecvError::Disconnected) => match self.join() {
                Err(e) => Some(Err(e)),
                Ok(()) => None,
            },
        }
    }

    /// Blocks until the worker finishes.
    pub fn wait(mut self) -> Outcome<M> {
        match self.rx.recv() {
            Ok(outcome) => {
                let _ = self.join();
                outcome
            }
            Err(_) => Err(self.join().err().unwrap_or(SearchError::WorkerPanicked)),
        }
    }

    /// Joins the worker thread if it has not been joined yet. A worker that
    /// panicked never sends, so its failure is surfaced here instead.
    fn join(&mut self) -> Result<(), SearchError> {
        let Some(handle) = self.thread.take() else {
            return Ok(());
        };
        let joined = handle.join().map_err(|_| {
            error!("search worker panicked");
            SearchError::WorkerPanicked
        });
        self.in_progress.store(false, Ordering::SeqCst);
        joined
    }
}
