//! Export Test Suite
//!
//! Workspace-level integration tests for the exporter and the segment
//! store backend:
//!
//! - `scenario`: exact-output serialization of known trees
//! - `containment`: omission behavior under injected store failures
//! - `wellformed`: property-based structural checks under random trees
//!   and random fault patterns
//! - `store_pipeline`: write-to-disk, damage, re-open, export
//!
//! ```bash
//! cargo test --test export_suite
//! ```

mod checker;

mod containment;
mod store_pipeline;
mod wellformed;
