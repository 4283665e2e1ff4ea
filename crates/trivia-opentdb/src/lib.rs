//! Client for the Open Trivia Database (<https://opentdb.com>).
//!
//! Fetches one multiple-choice question per call, base64-encoded on the
//! wire, and hands it to the quiz as a [`ProviderQuestion`].
//!
//! [`ProviderQuestion`]: trivia_core::provider::ProviderQuestion

pub mod client;
pub mod error;

pub use client::{OpenTdbClient, OpenTdbConfig};
pub use error::OpenTdbError;
