//! Commit engine - reconciles the edit buffer against the catalog service.
//!
//! A commit runs six phases in a fixed order:
//!
//! 1. delete variants, then products (the server cascades product deletes)
//! 2. create products, stripping defaults that point at unsaved variants
//! 3. create variants, resolving parents through the phase 2 id map
//! 4. update products, resolving defaults through the phase 3 id map
//! 5. update variants
//! 6. set the defaults deferred in phase 2
//!
//! Calls inside a phase run concurrently. A failing call ends the commit and
//! leaves earlier phases applied; re-committing the still-dirty buffer is the
//! recovery path.
//!
//! ## Example
//!
//! ```ignore
//! let plan = CommitPlan::from_buffer(&buffer);
//! let report = CommitEngine::new(&catalog).run(plan).await?;
//! let real_id = report.ids.resolve_product(&temp_product_id);
//! ```

mod engine;
mod error;
mod id_map;
mod plan;
mod report;

pub use engine::CommitEngine;
pub use error::{CommitError, CommitPhase};
pub use id_map::IdMap;
pub use plan::{CommitPlan, ProductCreate, ProductUpdate, VariantCreate, VariantUpdate};
pub use report::CommitReport;
