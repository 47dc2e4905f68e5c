//! Counters emitted through the global `metrics` recorder when the `metrics` feature is on.

// self
use crate::obs::{FlowKind, FlowOutcome};

const FLOW_TOTAL: &str = "oauth2_hubspot_flow_total";
const PROFILE_LOOKUP_TOTAL: &str = "oauth2_hubspot_profile_lookup_total";

/// How a raw profile lookup was served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileLookup {
	/// Served from the attempt's memoized profile.
	Hit,
	/// Required a request to the introspection endpoint.
	Fetch,
}
impl ProfileLookup {
	/// Returns the `result` label value.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProfileLookup::Hit => "hit",
			ProfileLookup::Fetch => "fetch",
		}
	}
}

/// Increments `oauth2_hubspot_flow_total{flow, outcome}`.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_TOTAL, "flow" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (FLOW_TOTAL, kind, outcome);
	}
}

/// Increments `oauth2_hubspot_profile_lookup_total{result}`.
pub fn record_profile_lookup(lookup: ProfileLookup) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(PROFILE_LOOKUP_TOTAL, "result" => lookup.as_str()).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (PROFILE_LOOKUP_TOTAL, lookup);
	}
}
