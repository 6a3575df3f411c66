use std::{
    io, mem,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use log::{info, warn};
use reedchess_engine::{BoardState, ChannelSink, Notification, RulesAdapter};
use reedchess_scanner::{Interrupt, MatrixLines, MatrixScanner};

use crate::{
    LoopExit, Settings, SettingsError,
    poll_loop::{Command, PollLoop},
};

const THREAD_NAME: &str = "reedchess-poll";

/// A failed control request.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ServiceError {
    /// `start` was called while polling.
    #[display("polling is already running")]
    AlreadyRunning,
    /// `stop` was called while idle.
    #[display("polling is not running")]
    NotRunning,
    /// The settings were rejected.
    #[display("invalid settings: {_0}")]
    Settings(#[from] SettingsError),
    /// The polling thread could not be spawned.
    #[display("failed to spawn the polling thread: {_0}")]
    Spawn(#[from] io::Error),
    /// The polling thread panicked or never started, taking the scanner and
    /// the position with it.
    #[display("the polling thread was lost")]
    Lost,
}

/// What the polling thread hands back when it ends.
struct Finished<L, R> {
    poll_loop: PollLoop<L, R>,
    commands: Receiver<Command>,
    exit: LoopExit,
}

enum State<L, R> {
    Idle(Box<PollLoop<L, R>>),
    Running {
        handle: JoinHandle<Finished<L, R>>,
        commands: Sender<Command>,
    },
    Lost,
}

/// Runs the scan-and-reconcile loop on a dedicated thread.
///
/// The service starts idle. [`start`](Self::start) moves the scanner and the
/// position onto the polling thread, and [`stop`](Self::stop) takes them back.
/// The position survives stopping and restarting; only
/// [`reset_game`](Self::reset_game) returns to the starting position.
pub struct BoardService<L, R> {
    state: State<L, R>,
    stop: Interrupt,
    snapshot: Arc<RwLock<BoardState>>,
}

impl<L, R> BoardService<L, R>
where
    L: MatrixLines + Send + 'static,
    R: RulesAdapter + Send + 'static,
{
    /// Creates an idle service and the receiving end of its notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if `settings` are invalid or the matrix does not fit
    /// the board.
    pub fn new(
        lines: L,
        rules: R,
        settings: Settings,
    ) -> Result<(Self, Receiver<Notification>), ServiceError> {
        settings.validate()?;
        let stop = Interrupt::new();
        let scanner = MatrixScanner::new(lines, settings.scan, stop.clone())
            .map_err(SettingsError::from)?;
        let (sink, receiver) = ChannelSink::bounded(settings.notification_capacity);
        let snapshot = Arc::new(RwLock::new(rules.state()));
        let poll_loop = PollLoop::new(scanner, rules, sink, Arc::clone(&snapshot), settings);
        let service = Self {
            state: State::Idle(Box::new(poll_loop)),
            stop,
            snapshot,
        };
        Ok((service, receiver))
    }

    /// Starts polling on a new thread.
    ///
    /// The first scan only records which squares are occupied, so pieces
    /// already on the board are not reported as placements.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyRunning`] if polling is running, or an
    /// error if the thread cannot be spawned.
    pub fn start(&mut self) -> Result<(), ServiceError> {
        if let Some(exit) = self.reclaim_finished()? {
            info!("previous polling run had ended: {exit:?}");
        }
        let poll_loop = match mem::replace(&mut self.state, State::Lost) {
            State::Idle(poll_loop) => poll_loop,
            running @ State::Running { .. } => {
                self.state = running;
                return Err(ServiceError::AlreadyRunning);
            }
            State::Lost => return Err(ServiceError::Lost),
        };

        self.stop.clear();
        let (commands, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || {
                let mut poll_loop = poll_loop;
                let exit = poll_loop.run(&receiver);
                Finished {
                    poll_loop: *poll_loop,
                    commands: receiver,
                    exit,
                }
            })?;
        self.state = State::Running { handle, commands };
        Ok(())
    }

    /// Stops polling and waits for the thread to finish.
    ///
    /// Returns why the loop ended; a loop that ended by itself reports its own
    /// reason. Every sensor line is released.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotRunning`] if polling was not started.
    pub fn stop(&mut self) -> Result<LoopExit, ServiceError> {
        match mem::replace(&mut self.state, State::Lost) {
            State::Running { handle, .. } => {
                self.stop.raise();
                handle.thread().unpark();
                self.join(handle)
            }
            State::Idle(poll_loop) => {
                self.state = State::Idle(poll_loop);
                Err(ServiceError::NotRunning)
            }
            State::Lost => Err(ServiceError::Lost),
        }
    }

    /// Returns to the starting position, dropping any selection and pending
    /// castling relocation.
    ///
    /// While polling, the reset is applied by the polling thread before its
    /// next scan.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Lost`] if the polling thread was lost.
    pub fn reset_game(&mut self) -> Result<(), ServiceError> {
        self.reclaim_finished()?;
        match &mut self.state {
            State::Idle(poll_loop) => {
                poll_loop.reset_game();
                Ok(())
            }
            State::Running { commands, .. } => commands
                .send(Command::ResetGame)
                .map_err(|_| ServiceError::Lost),
            State::Lost => Err(ServiceError::Lost),
        }
    }

    /// Returns whether the polling loop is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(&self.state, State::Running { handle, .. } if !handle.is_finished())
    }

    /// Returns the FEN of the last committed position.
    #[must_use]
    pub fn current_fen(&self) -> String {
        self.read_snapshot().fen.clone()
    }

    /// Returns a snapshot of the last committed position.
    #[must_use]
    pub fn board_state(&self) -> BoardState {
        self.read_snapshot().clone()
    }

    /// Stops polling if needed and returns the sensor lines and the position.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Lost`] if the polling thread was lost.
    pub fn into_parts(mut self) -> Result<(L, R), ServiceError> {
        if matches!(self.state, State::Running { .. }) {
            self.stop()?;
        }
        match mem::replace(&mut self.state, State::Lost) {
            State::Idle(poll_loop) => Ok(poll_loop.into_parts()),
            State::Running { .. } | State::Lost => Err(ServiceError::Lost),
        }
    }

    fn read_snapshot(&self) -> RwLockReadGuard<'_, BoardState> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes back the parts of a loop that ended by itself.
    fn reclaim_finished(&mut self) -> Result<Option<LoopExit>, ServiceError> {
        match mem::replace(&mut self.state, State::Lost) {
            State::Running { handle, .. } if handle.is_finished() => self.join(handle).map(Some),
            state => {
                self.state = state;
                Ok(None)
            }
        }
    }

    fn join(&mut self, handle: JoinHandle<Finished<L, R>>) -> Result<LoopExit, ServiceError> {
        let Ok(finished) = handle.join() else {
            warn!("polling thread panicked");
            return Err(ServiceError::Lost);
        };
        let Finished {
            mut poll_loop,
            commands,
            exit,
        } = finished;
        // Requests sent after the last cycle still apply.
        poll_loop.apply_commands(&commands);
        self.stop.clear();
        self.state = State::Idle(Box::new(poll_loop));
        Ok(exit)
    }
}

impl<L, R> Drop for BoardService<L, R> {
    fn drop(&mut self) {
        if let State::Running { handle, .. } = mem::replace(&mut self.state, State::Lost) {
            self.stop.raise();
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}
