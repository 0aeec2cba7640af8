//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for goal, tactic and metric ids and the fixed label sets
pub mod autocomplete;
