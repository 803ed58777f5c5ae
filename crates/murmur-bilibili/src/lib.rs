//! Bilibili client for murmur.
//!
//! This crate talks to the two Bilibili endpoints murmur needs:
//! - the creator-center comment list (one bounded page, newest first)
//! - the reply-add endpoint used to answer a comment
//!
//! Authentication is cookie based; the caller supplies a ready-made
//! [`Credential`].

mod client;
mod error;
mod types;

pub use client::{BilibiliClient, DEFAULT_API_URL, DEFAULT_MEMBER_URL};
pub use error::BilibiliError;
pub use types::*;
