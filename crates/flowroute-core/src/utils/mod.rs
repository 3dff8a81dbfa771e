//! Utility functions for flowroute.
//!
//! - [`text`]: URI transliteration helpers.

pub mod text;
