//! Lens module
//!
//! Presentation helpers sitting between the store and the command line.
//!
//! | Module | Feature Required | Provides |
//! |--------|-----------------|----------|
//! | `utils` | (none) | `OutputFormat` |
//! | `report` | `display` | table/markdown/PSV/JSON rendering of store views |

pub mod utils;

#[cfg(feature = "display")]
pub mod report;
