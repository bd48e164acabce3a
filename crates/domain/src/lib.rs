//! # homelite-domain
//!
//! Pure domain model for the homelite smart-home hub.
//!
//! ## Responsibilities
//! - Foundational types: device identifiers, error conventions, timestamps
//! - Define **Devices** (the registry's unit of identity and state) and the
//!   request shapes that mutate them (drafts, patches, commands)
//! - Define **property values** (the typed open key/value bag attached to
//!   every device)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod device;
pub mod error;
pub mod id;
pub mod property;
pub mod time;
