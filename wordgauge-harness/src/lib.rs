//! Session orchestration for the vocabulary-test harness.
//!
//! The flow mirrors what a human does on the page: get past the
//! verification gate, tick a handful of known words per round, continue,
//! and read the estimate off the results view. Everything page-specific is
//! isolated behind [`surface::VocabSurface`]; the rest of the crate is
//! browser-free and tested in memory.

pub mod gate;
pub mod live;
pub mod record;
pub mod rounds;
pub mod session;
pub mod surface;
pub mod transition;
