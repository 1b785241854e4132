//! Core types and trait definitions for the curricular advancement engine.
//!
//! The plan model, the mutation protocol and the progress aggregator are pure
//! and synchronous. Persistence, notification and local ids are reached through
//! the traits in [`store`], [`notify`] and [`identity`].

pub mod error;
pub mod events;
pub mod identity;
pub mod mutation;
pub mod notify;
pub mod plan;
pub mod prerequisites;
pub mod progress;
pub mod semester;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
