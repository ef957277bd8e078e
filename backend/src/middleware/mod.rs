//! Actix middleware applied to every formatter route.

pub mod trace;

pub use trace::Trace;
