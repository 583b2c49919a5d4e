//! Sharing a game between the training thread and observers.

use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use crate::{
    Error, Result,
    game::{Board, Direction, Game, MoveOutcome},
    pipeline::training::{TrainingPipeline, TrainingResult},
    ports::Learner,
};

/// Thread-safe handle to a [`Game`].
///
/// Every mutation holds the lock for its whole duration, and reads hand out
/// copies, so an observer never sees a board in the middle of a move.
///
/// # Examples
///
/// ```
/// use tilemind::game::{Direction, Game};
/// use tilemind::pipeline::SharedGame;
///
/// let shared = SharedGame::new(Game::with_seed(1));
/// let observer = shared.clone();
///
/// shared.apply_move(Direction::Left)?;
/// let snapshot = observer.current_board()?;
/// assert_eq!(snapshot.score(), shared.score()?);
/// # Ok::<(), tilemind::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Game>> {
        self.inner.lock().map_err(|_| Error::LockPoisoned {
            resource: "game".to_string(),
        })
    }

    /// Run `f` with exclusive access to the game.
    ///
    /// No other reader or writer runs until `f` returns.
    pub fn with_game<T>(&self, f: impl FnOnce(&mut Game) -> T) -> Result<T> {
        let mut game = self.lock()?;
        Ok(f(&mut game))
    }

    pub fn current_board(&self) -> Result<Board> {
        Ok(self.lock()?.current_board())
    }

    pub fn score(&self) -> Result<u64> {
        Ok(self.lock()?.score())
    }

    pub fn is_terminal(&self) -> Result<bool> {
        Ok(self.lock()?.is_terminal())
    }

    pub fn moves_made(&self) -> Result<usize> {
        Ok(self.lock()?.moves_made())
    }

    pub fn apply_move(&self, direction: Direction) -> Result<MoveOutcome> {
        Ok(self.lock()?.apply_move(direction))
    }

    pub fn reset(&self) -> Result<()> {
        self.lock()?.reset();
        Ok(())
    }
}

impl From<Game> for SharedGame {
    fn from(game: Game) -> Self {
        Self::new(game)
    }
}

/// Cooperative stop signal, checked once per training iteration.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A training run on its own thread.
pub struct TrainerHandle<L> {
    handle: JoinHandle<Result<(TrainingResult, L)>>,
    stop: StopFlag,
}

impl<L> TrainerHandle<L> {
    /// Ask the trainer to stop after the step in progress.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to end and get the learner back.
    pub fn join(self) -> Result<(TrainingResult, L)> {
        self.handle.join().map_err(|_| Error::TrainerPanicked)?
    }
}

/// Run `pipeline` on a dedicated thread against `game`.
///
/// The pipeline's stop flag is replaced by the one owned by the returned
/// handle. Callers keep their own clone of `game` to observe it.
pub fn spawn_trainer<L>(
    pipeline: TrainingPipeline,
    game: SharedGame,
    mut learner: L,
) -> TrainerHandle<L>
where
    L: Learner + 'static,
{
    let stop = StopFlag::new();
    let mut pipeline = pipeline.with_stop_flag(stop.clone());
    let handle = thread::spawn(move || {
        let result = pipeline.run(&game, &mut learner)?;
        Ok((result, learner))
    });
    TrainerHandle { handle, stop }
}
