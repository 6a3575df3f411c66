//! Polling service for the reed-switch chessboard.
//!
//! [`BoardService`] owns the scanner and the logical position and runs the
//! scan, diff, and reconcile cycle on a dedicated thread. Serving threads talk
//! to it only through the control methods, a read-only [`BoardState`]
//! snapshot, and the notification channel returned on construction.
//!
//! # Examples
//!
//! ```
//! use reedchess_app::{BoardService, LoopExit, Settings};
//! use reedchess_engine::ChessRules;
//! use reedchess_scanner::{ScanConfig, SimulatedBoard};
//!
//! let board = SimulatedBoard::new();
//! let settings = Settings {
//!     scan: ScanConfig::immediate(),
//!     ..Settings::default()
//! };
//! let (mut service, _notifications) =
//!     BoardService::new(board.matrix(), ChessRules::new(), settings)?;
//!
//! service.start()?;
//! assert!(service.is_running());
//! assert_eq!(service.stop()?, LoopExit::Stopped);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`BoardState`]: reedchess_engine::BoardState

pub use self::{
    poll_loop::LoopExit,
    service::{BoardService, ServiceError},
    settings::{Settings, SettingsError},
};

mod poll_loop;
mod service;
mod settings;
