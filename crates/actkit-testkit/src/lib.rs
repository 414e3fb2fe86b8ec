//! # actkit testkit
//!
//! Testing utilities for actkit.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: History paths every implementation must reproduce exactly
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A publisher, a shared store and a pinned clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use actkit_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use actkit_testkit::generators::{identity, tags};
//!
//! proptest! {
//!     #[test]
//!     fn session_is_symmetric(a in identity(), b in identity(), t in tags(4)) {
//!         let ab = a.session().derive(&b.public_key(), &t).unwrap();
//!         let ba = b.session().derive(&a.public_key(), &t).unwrap();
//!         prop_assert_eq!(ab, ba);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use actkit_testkit::fixtures::{grantees, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let readers = grantees(2);
//! fixture.tick(60);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{grantees, public_keys, TestFixture, START_TIME};
pub use generators::HistoryParams;
pub use vectors::{all_vectors, verify_all_vectors, HistoryKeyVector};
