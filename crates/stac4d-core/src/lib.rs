//! stac4d core - STAC model, CRS handling, source readers and configuration
//!
//! This crate holds the domain types shared by the other stac4d crates. It
//! has no notion of a catalog on disk; see `stac4d-store` for that.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod temporal;

pub use error::{Result, Stac4dError};
