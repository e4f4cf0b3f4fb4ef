//! Ingestion worker for the depot app store.
//!
//! Takes submissions from the staging area (`publish/<bundleId>/`), validates
//! their identity and manifest, copies their artifacts into the published tree
//! and merges their metadata into `index.json`.
//!
//! # Quick Start
//!
//! ```no_run
//! use depot_core::{StoreConfig, SubmissionProcessor};
//!
//! # fn example() -> Result<(), depot_core::StoreError> {
//! let config = StoreConfig::from_env("/srv/store");
//! let report = SubmissionProcessor::new(config).run()?;
//! println!("{} published, {} denied", report.published(), report.denied());
//! # Ok(())
//! # }
//! ```
//!
//! # Store layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `publish/<bundleId>/manifest.json` | Submission manifest (required) |
//! | `publish/<bundleId>/app.<ext>` | Primary payload (optional) |
//! | `publish/<bundleId>/icon.*` | Icon assets |
//! | `apps/<category>/<bundleId>/<version>.<ext>` | Published payload |
//! | `apps/<category>/<bundleId>/latest.<ext>` | Last processed payload |
//! | `assets/<bundleId>/<file>` | Published icons |
//! | `index.json` | Catalog |

pub mod bundle_id;
pub mod config;
mod digest;
pub mod error;
pub mod index;
pub mod manifest;
pub mod processor;
pub mod publish;
pub mod report;
pub mod staging;

pub use bundle_id::{namespace_check, validate_bundle_id, BundleId, NamespaceCheck};
pub use config::StoreConfig;
pub use error::{Denial, StoreError, StoreResult};
pub use index::{AppEntry, MergeAction, StoreIndex, INDEX_VERSION};
pub use manifest::{Manifest, DEFAULT_CATEGORY, DEFAULT_VERSION, MANIFEST_FILE};
pub use processor::SubmissionProcessor;
pub use publish::{publish_icon, publish_payload, PublishedPayload};
pub use report::{RunReport, SubmissionOutcome};
pub use staging::{list_pending, PendingSubmission};
