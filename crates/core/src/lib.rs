//! Domain logic for the tarannum recording intake service.
//!
//! Holds the submission model, ledger layout and provisioning, artifact
//! naming, and the submission workflow. Remote services are reached only
//! through the traits in [`remote`].

pub mod error;
pub mod i18n;
pub mod ledger;
pub mod memory;
pub mod naming;
pub mod remote;
pub mod staging;
pub mod submission;
pub mod workflow;
