// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Group exceptions (mirrors [workspace.lints] in Cargo.toml)
#![allow(clippy::future_not_send)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::use_self)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Results-view coordination for partial atomic charge calculations.
//!
//! A results page shows one structure of a finished computation in a 3D
//! viewer, with controls for structure, charge set, coloring and style.
//! This crate owns everything between those controls, the charge backend
//! and the visualization engine.
//!
//! # Key entry points
//!
//! - [`coordinator::ResultsCoordinator`] - the single writer of control
//!   state; every user intent goes through it
//! - [`control::ControlState`] - the snapshot widgets render from
//! - [`viewer::ViewerHandle`] - the engine session boundary, with a
//!   headless mmCIF implementation in [`viewer::HeadlessViewer`]
//! - [`backend::ComputationService`] - the charge backend boundary
//! - [`options::Options`] - backend location and initial view settings
//!
//! # Architecture
//!
//! Every async call carries a sequence token. Responses that lost the race
//! to a newer request are discarded, so the published state always matches
//! the latest request and what the engine displays. After each structure
//! load the engine resets its cosmetics; the coordinator re-applies the
//! user's coloring and style on top. A [`busy::BusyTracker`] aggregates
//! outstanding operations into a loading indicator.

pub mod backend;
pub mod busy;
pub mod control;
pub mod coordinator;
pub mod error;
pub mod options;
pub mod session;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::ResultsCoordinator;
pub use error::ChargeViewError;
pub use session::Session;
