// Path: crates/dps-test-utils/src/lib.rs
//! Test-only utilities for the Data Provider Service workspace: an
//! in-memory `IndexReader` for exercising `dps-rpc` and `dps-invoker`
//! without a `redb` database on disk, plus small fixture builders for the
//! domain entities, mirroring the teacher's `test_utils` crate's role
//! (`TestFixtures`, `Fixtures`) without carrying its ZK-specific tooling,
//! which has no counterpart here.

pub mod fixtures;
pub mod memory_index;

pub use fixtures::sample_header;
pub use memory_index::InMemoryIndex;
