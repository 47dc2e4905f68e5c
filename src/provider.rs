//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated configuration (`ProviderDescriptor`): the HTTPS-only site,
//! authorization, and token endpoints, the authorize-time parameters a host may forward,
//! client authentication preferences, and provider quirks (PKCE requirement, scope
//! delimiter). `strategy` defines [`Strategy`], the pluggable unit that knows where a
//! provider's raw profile lives and how to normalize it. `hubspot` ships the HubSpot
//! implementation.

pub mod descriptor;
pub mod hubspot;
pub mod strategy;

pub use descriptor::*;
pub use hubspot::*;
pub use strategy::*;
