//! # breed-core
//!
//! Pure logic for the breed catalog (no I/O, instant tests).
//!
//! This crate holds the state machines and combination rules used by
//! `breed-client` without touching the network, the database or the clock.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure**: they take input and produce output
//! without side effects. The I/O (HTTP, SQLite, task spawning) lives in
//! `breed-client`, which interprets the actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod cursor;
pub mod search;
pub mod state;

pub use compose::{join_breeds, AutoFetchGate};
pub use cursor::{PageRequest, LAST_PAGE_KEY, PAGE_SIZE};
pub use search::{normalize_keyword, resolve_offline, SearchResolution};
pub use state::{Action, Event, OperationState};
