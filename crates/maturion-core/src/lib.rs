//! # Maturion Core
//!
//! Pure, WASM-safe logic for Maturion's document and feedback pipelines:
//! data models, sliding-window chunking, pattern strength classification,
//! feedback weights, tier statistics, and the pattern store trait.
//!
//! This crate contains no tokio, filesystem I/O, or other native-only
//! dependencies. Every function here is synchronous and operates on
//! caller-owned data; persistence and concurrency control belong to the
//! [`store::PatternStore`] implementation the caller plugs in.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chunk`] | Fixed-size overlapping text windows |
//! | [`classify`] | Strength tiers and metric updates |
//! | [`weights`] | Feedback weight table with default fallback |
//! | [`stats`] | Per-tier aggregate statistics |
//! | [`models`] | Shared data types |
//! | [`store`] | Pattern persistence trait + in-memory backend |

pub mod chunk;
pub mod classify;
pub mod error;
pub mod models;
pub mod stats;
pub mod store;
pub mod weights;

pub use error::CoreError;
