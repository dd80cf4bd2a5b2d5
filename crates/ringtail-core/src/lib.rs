//! # Ringtail Core Library
//!
//! Option resolution and cross-database selectivity for virtual-screening
//! result databases.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout with a storage seam underneath.
//!
//! - **[`core`]: The Foundation.** Stateless models: residue selectors, output
//!   fields and the canonical `FilterSpec`.
//!
//! - **[`engine`]: The Logic Core.** Resolves raw option layers into validated
//!   specs and runs include/exclude cross-reference chains against a
//!   [`store::DatabaseGateway`].
//!
//! - **[`store`]: The Storage Seam.** The gateway trait and its SQLite
//!   implementation. Secondary databases are only ever attached read-only.
//!
//! - **[`workflows`]: The Public API.** Complete procedures that open the
//!   reference database, run the engine, persist or export the outcome and
//!   close the connection.

pub mod core;
pub mod engine;
pub mod store;
pub mod workflows;
