//! Time-bounded auth credential installed into the token store.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token plus the window in which the provider accepts it.
///
/// Credentials are immutable; the store replaces them wholesale so the token and its expiry are
/// always observed together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Auth token attached to every dispatch request.
	pub token: TokenSecret,
	/// Instant the token was fetched.
	pub issued_at: OffsetDateTime,
	/// First instant at which the token is no longer usable.
	pub valid_until: OffsetDateTime,
}
impl Credential {
	/// Validity window stamped onto tokens when the provider does not declare one.
	pub const DEFAULT_VALIDITY: Duration = Duration::hours(1);
	/// Longest validity window accepted from configuration or from the provider.
	pub const MAX_VALIDITY: Duration = Duration::days(1);

	/// Creates a credential valid for `validity` starting at `issued_at`.
	///
	/// The expiry saturates at the largest representable instant instead of overflowing.
	pub fn new(
		token: impl Into<TokenSecret>,
		issued_at: OffsetDateTime,
		validity: Duration,
	) -> Self {
		Self { token: token.into(), issued_at, valid_until: issued_at.saturating_add(validity) }
	}

	/// Returns `true` if the credential is usable at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.valid_until
	}

	/// Remaining lifetime at `instant`, clamped to zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.valid_until - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn validity_is_exclusive_of_the_expiry_instant() {
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let credential = Credential::new("token", issued, Credential::DEFAULT_VALIDITY);

		assert_eq!(credential.valid_until, macros::datetime!(2025-11-10 13:00 UTC));
		assert!(credential.is_valid_at(issued));
		assert!(credential.is_valid_at(macros::datetime!(2025-11-10 12:59:59 UTC)));
		assert!(!credential.is_valid_at(credential.valid_until));
	}

	#[test]
	fn remaining_lifetime_clamps_to_zero() {
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let credential = Credential::new("token", issued, Duration::minutes(5));

		assert_eq!(credential.remaining_at(issued + Duration::minutes(2)), Duration::minutes(3));
		assert_eq!(credential.remaining_at(issued + Duration::hours(2)), Duration::ZERO);
	}

	#[test]
	fn oversized_validity_saturates_instead_of_panicking() {
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let credential =
			Credential::new("token", issued, Duration::seconds(1_700_000_000_000_000));

		assert!(credential.valid_until > issued);
		assert!(credential.is_valid_at(issued + Duration::days(365)));
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let credential =
			Credential::new("live-token", OffsetDateTime::now_utc(), Duration::minutes(1));

		assert!(!format!("{credential:?}").contains("live-token"));
	}
}
