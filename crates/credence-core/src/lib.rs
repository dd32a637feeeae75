//! Core types and trait definitions for the Credence claim tracker.
//!
//! Domain types, credibility rules and the [`store::CredenceStore`] trait.
//! No HTTP or database code lives here.

#![allow(async_fn_in_trait)]

pub mod claim;
pub mod comment;
pub mod credibility;
pub mod error;
pub mod evidence;
pub mod query;
pub mod store;
pub mod user;
pub mod vote;

pub use error::{Error, Result};
