//! kmon — an interactive kernel debug monitor and a user-space filesystem
//! client for a small teaching operating system.
//!
//! The [`monitor`] module drives an operator console over a suspended
//! program: it tokenizes command lines, walks the frame-pointer chain to
//! print symbolic backtraces, and toggles single-instruction stepping in
//! the saved trap context. The [`fs`] module turns POSIX-like file calls
//! into synchronous page-sized requests against a filesystem server
//! reached through a pluggable transport. The [`snapshot`] module loads a
//! TOML dump of a suspended machine so both the `kmon` binary and the
//! tests can run the monitor without live hardware.

pub mod error;
pub mod fs;
pub mod log;
pub mod monitor;
pub mod snapshot;

pub use error::Error;
