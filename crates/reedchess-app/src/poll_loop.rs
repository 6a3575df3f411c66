use std::{
    sync::{Arc, PoisonError, RwLock, mpsc::Receiver},
    thread,
    time::Instant,
};

use log::{debug, error, info, warn};
use reedchess_core::{Observation, OccupancyTracker};
use reedchess_engine::{
    BoardState, ChannelSink, GameOutcome, Notification, NotificationSink as _, Reconciler,
    RulesAdapter,
};
use reedchess_scanner::{Interrupt, MatrixLines, MatrixScanner, ScanError};

use crate::Settings;

/// Why the polling loop ended.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum LoopExit {
    /// The service asked it to stop.
    Stopped,
    /// The position is terminal.
    GameOver(GameOutcome),
    /// Too many consecutive scans failed; the last error is kept.
    Fault(ScanError),
}

/// Requests applied by the polling thread between two cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    ResetGame,
}

/// Everything the polling thread owns.
#[derive(Debug)]
pub(crate) struct PollLoop<L, R> {
    scanner: MatrixScanner<L>,
    rules: R,
    tracker: OccupancyTracker,
    reconciler: Reconciler,
    sink: ChannelSink,
    snapshot: Arc<RwLock<BoardState>>,
    settings: Settings,
    primed: bool,
    consecutive_faults: u32,
}

impl<L, R> PollLoop<L, R>
where
    L: MatrixLines,
    R: RulesAdapter,
{
    pub(crate) fn new(
        scanner: MatrixScanner<L>,
        rules: R,
        sink: ChannelSink,
        snapshot: Arc<RwLock<BoardState>>,
        settings: Settings,
    ) -> Self {
        Self {
            scanner,
            rules,
            tracker: OccupancyTracker::default(),
            reconciler: Reconciler::new(),
            sink,
            snapshot,
            settings,
            primed: false,
            consecutive_faults: 0,
        }
    }

    pub(crate) fn stop_flag(&self) -> &Interrupt {
        self.scanner.interrupt()
    }

    /// Runs cycles until stopped, the game ends, or the sensor fails.
    pub(crate) fn run(&mut self, commands: &Receiver<Command>) -> LoopExit {
        info!(
            "polling started, interval {:?}, fault threshold {}",
            self.settings.poll_interval, self.settings.fault_threshold
        );
        // Pieces already standing on the board must not look like placements.
        self.primed = false;
        self.consecutive_faults = 0;
        let exit = self.cycles(commands);
        self.scanner.release();
        info!("polling ended: {exit:?}");
        exit
    }

    fn cycles(&mut self, commands: &Receiver<Command>) -> LoopExit {
        loop {
            if self.stop_flag().is_raised() {
                return LoopExit::Stopped;
            }
            self.apply_commands(commands);

            if let Some(outcome) = self.rules.outcome() {
                info!("game over: {outcome}");
                self.sink.notify(Notification::GameOver { outcome });
                return LoopExit::GameOver(outcome);
            }

            match self.scanner.scan() {
                Ok(occupancy) => {
                    self.consecutive_faults = 0;
                    if self.primed {
                        if let Observation::Changed(diff) = self.tracker.observe(occupancy) {
                            let reaction =
                                self.reconciler
                                    .reconcile(&diff, &mut self.rules, &mut self.sink);
                            debug!("{diff} -> {reaction:?}");
                            if reaction.is_move_committed() {
                                self.publish_snapshot();
                            }
                        }
                    } else {
                        debug!("baseline scan: {} squares occupied", occupancy.len());
                        self.tracker.reset(occupancy);
                        self.primed = true;
                    }
                }
                Err(err) if err.is_interrupted() => return LoopExit::Stopped,
                Err(err) => {
                    self.consecutive_faults += 1;
                    if self.consecutive_faults >= self.settings.fault_threshold {
                        error!(
                            "giving up after {} consecutive scan failures: {err}",
                            self.consecutive_faults
                        );
                        return LoopExit::Fault(err);
                    }
                    warn!(
                        "scan failed ({}/{}), skipping cycle: {err}",
                        self.consecutive_faults, self.settings.fault_threshold
                    );
                }
            }

            if !self.sleep() {
                return LoopExit::Stopped;
            }
        }
    }

    /// Sleeps for one poll interval. Returns `false` if asked to stop.
    fn sleep(&self) -> bool {
        let deadline = Instant::now() + self.settings.poll_interval;
        loop {
            if self.stop_flag().is_raised() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::park_timeout(deadline - now);
        }
    }

    pub(crate) fn apply_commands(&mut self, commands: &Receiver<Command>) {
        while let Ok(command) = commands.try_recv() {
            match command {
                Command::ResetGame => self.reset_game(),
            }
        }
    }

    /// Restores the starting position and rebaselines the board on the next
    /// scan.
    pub(crate) fn reset_game(&mut self) {
        info!("resetting game");
        self.rules.reset();
        self.reconciler.reset();
        self.primed = false;
        self.publish_snapshot();
        self.sink
            .notify(Notification::BoardChanged(self.rules.state()));
    }

    fn publish_snapshot(&self) {
        let state = self.rules.state();
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub(crate) fn into_parts(self) -> (L, R) {
        (self.scanner.into_lines(), self.rules)
    }
}
