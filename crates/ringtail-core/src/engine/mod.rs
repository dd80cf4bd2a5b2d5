//! # Engine Module
//!
//! Option resolution and the cross-database selectivity engine.
//!
//! ## Overview
//!
//! Resolution is a pure function from a merged [`options::RawOptions`] layer and
//! a [`options::RunMode`] to the validated specs handed to the database builder
//! and the filter runner. Coercible combinations are fixed up and reported as
//! [`resolver::OptionWarning`]s; everything else is a hard [`error::EngineError`].
//!
//! Cross-referencing runs a [`selectivity::SelectivitySession`] against any
//! [`crate::store::DatabaseGateway`], one step at a time.
//!
//! ## Architecture
//!
//! - **Options** ([`options`]) - raw option layers and their merge order
//! - **Resolution** ([`resolver`]) - warn-and-coerce canonicalization followed by validation
//! - **Specs** ([`config`]) - the resolved write, read and output specs
//! - **Selectivity** ([`selectivity`]) - include/exclude chains over result databases
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - engine-specific error types

pub mod config;
pub mod error;
pub mod options;
pub mod progress;
pub mod resolver;
pub mod selectivity;
