//! # Core Module
//!
//! Stateless building blocks shared by the resolver and the selectivity engine.
//!
//! - **Residue selectors** ([`residue`]) - parsing of `[~]CHAIN:RES:NUM:ATOM` tokens
//! - **Output fields** ([`fields`]) - the fixed set of reportable result fields
//! - **Filters** ([`filters`]) - the canonical [`filters::FilterSpec`] model

pub mod fields;
pub mod filters;
pub mod residue;
