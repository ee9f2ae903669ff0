//! # Opipe Trust Core Test Suite
//!
//! Unified test crate for cross-component scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── envelope_flows.rs    # sign/verify/replay/namespace scenarios
//!     └── admission_flows.rs   # end-to-end admission decisions
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p opipe-tests
//! ```

#![allow(dead_code)]

pub mod integration;
