//! Oracle client capability interface: the language-model second opinion
//! consulted only in the ambiguous confidence band the action resolver
//! leaves open.
//!
//! The engine depends on the [`client::OracleClient`] trait only; this
//! crate ships three implementations (mock, timeout-wrapping, unavailable)
//! plus a caching decorator, any of which can be composed behind
//! `Arc<dyn OracleClient>`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod caching;
pub mod client;
pub mod mock;
pub mod timeout;
pub mod types;
pub mod unavailable;

pub use caching::CachingOracle;
pub use client::OracleClient;
pub use mock::MockOracle;
pub use timeout::TimeoutWrappingOracle;
pub use types::{Determination, OracleRequest, OracleResponse};
pub use unavailable::UnavailableOracle;
