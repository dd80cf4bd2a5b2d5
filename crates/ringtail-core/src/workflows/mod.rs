//! # Workflows Module
//!
//! End-to-end procedures built from the engine and the store.
//!
//! - **Selectivity Workflow** ([`selectivity`]) - opens the reference database,
//!   runs a cross-reference chain, then optionally saves and exports the final
//!   bookmark. The reference connection is closed on every exit path.

pub mod selectivity;
