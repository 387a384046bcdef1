//! # bakery-sync
//!
//! Export indexing, staleness resolution and batched baking.
//!
//! Call [`pipeline::run`] to index the exports directory, decide which chart
//! references are stale and bake them batch by batch. The pieces are public
//! for callers that only need part of the flow:
//! [`build_index`], [`resolve_stale`], [`run_bake`].

pub mod baker;
pub mod error;
pub mod export_index;
pub mod oracle;
pub mod orchestrator;
pub mod pipeline;
pub mod staleness;

pub use baker::{Baker, CommandBaker};
pub use error::{BakeError, FilenameError, OracleError, SyncError};
pub use export_index::{build_index, ExportIndex};
pub use oracle::{CatalogOracle, MemoryOracle, VersionOracle};
pub use orchestrator::{run_bake, BakeReport, BatchOutcome};
pub use staleness::{assess, resolve_stale, Assessment, Freshness};
