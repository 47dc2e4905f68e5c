// self
use crate::_prelude::*;

/// Provider endpoints the strategy talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Browser-facing authorization endpoint.
	Authorization,
	/// Token endpoint used for the code exchange.
	Token,
	/// Token-introspection endpoint that yields the raw profile.
	RawInfo,
}
impl EndpointKind {
	/// Returns a stable label suitable for messages and telemetry.
	pub fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Authorization => "authorization",
			EndpointKind::Token => "token",
			EndpointKind::RawInfo => "raw info",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
