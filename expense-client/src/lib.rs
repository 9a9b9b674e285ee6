//! Data-access services and view state for the expense tracker frontend.
//!
//! Everything here runs on a single thread: the services hold `Rc`s and their futures are not
//! `Send`.

pub mod api;
pub mod chart;
pub mod dashboard;
pub mod filter;
pub mod list;
pub mod query;
