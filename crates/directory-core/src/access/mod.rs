//! ============================================================================
//! Access Module - Escalating access policy for the profile directory
//! ============================================================================
//! Decides, before any fetch, whether a page request may proceed.
//!
//! ## Policy
//! - **Initial page**: always permitted, guests and members alike
//! - **Guest "load more"**: redirected to the authentication surface
//! - **Member "load more"**: permitted until the allowance is used, then
//!   redirected to the alternate search surface
//!
//! ## Usage
//! ```rust,ignore
//! use directory_core::access::{AccessGate, GateDecision};
//!
//! let gate = AccessGate::default();
//! match gate.decide(RequestKind::LoadMore, &viewer, usage) {
//!     GateDecision::Permit => { /* fetch */ }
//!     GateDecision::Redirect(target) => navigator.navigate(config.path_for(target)),
//! }
//! ```
//! ============================================================================

mod gate;
mod types;

pub use gate::{AccessGate, DEFAULT_MEMBER_ALLOWANCE};
pub use types::{GateDecision, RedirectTarget};
