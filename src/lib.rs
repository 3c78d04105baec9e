//! questlog - gamification core for a code-learning platform
//!
//! Tracks exercise progress, XP/levels/streaks, achievements, and
//! notifications for a browser-based learning product. The heavy lifting
//! (editor, rendering, the code-execution backend) lives elsewhere; this
//! crate is the bookkeeping: three cooperating ledgers that persist to a
//! pluggable key-value [`store::Store`] and a [`session::Session`] that
//! drives them in the right order after each submission.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use questlog::exec::ExecutionClient;
//! use questlog::session::Session;
//! use questlog::store::FileStore;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = Arc::new(FileStore::open_default()?);
//! let mut session = Session::new(store);
//! let exec = ExecutionClient::new("http://localhost:8080");
//!
//! session.progress.start_exercise(42);
//! let outcome = exec.submit(42, "fn main() {}")?;
//! for event in session.record_submission(42, &outcome) {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod exec;
pub mod ledger;
pub mod notify;
pub mod session;
pub mod store;

pub use ledger::*;
pub use session::{LedgerEvent, LocalClock, Session};
