//! HTTP front end for the tarannum recording intake.
//!
//! Serves the intake form, accepts multipart submissions and hands them to
//! [`tarannum_core::workflow::SubmissionWorkflow`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
