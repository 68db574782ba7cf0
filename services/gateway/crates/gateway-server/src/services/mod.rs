//! Gateway use-cases.
//!
//! Each module implements one endpoint's behaviour over the traits in
//! `crate::ports`; none of them know about HTTP or AWS.

pub mod broker;
pub mod checker;
pub mod compute;
pub mod reset;
