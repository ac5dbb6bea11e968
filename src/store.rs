//! Per-client credential store shared by the dispatcher and the background refresher.

// self
use crate::{_prelude::*, auth::Credential};

/// Holds the current [`Credential`] behind a read-optimized lock.
///
/// The write path only swaps an [`Arc`], so readers never wait longer than that swap and never
/// observe a token paired with another token's expiry.
#[derive(Debug)]
pub struct TokenStore(RwLock<Arc<Credential>>);
impl TokenStore {
	/// Creates a store seeded with `initial`.
	pub fn new(initial: Credential) -> Self {
		Self(RwLock::new(Arc::new(initial)))
	}

	/// Returns the latest credential regardless of expiry.
	pub fn current(&self) -> Arc<Credential> {
		self.0.read().clone()
	}

	/// Returns the latest credential only if it is still usable at `instant`.
	pub fn valid_at(&self, instant: OffsetDateTime) -> Option<Arc<Credential>> {
		let current = self.current();

		current.is_valid_at(instant).then_some(current)
	}

	/// Installs `credential`, returning the one it replaced.
	pub fn replace(&self, credential: Credential) -> Arc<Credential> {
		let next = Arc::new(credential);

		std::mem::replace(&mut *self.0.write(), next)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn credential(token: &str) -> Credential {
		Credential::new(token, macros::datetime!(2025-11-10 12:00 UTC), Duration::hours(1))
	}

	#[test]
	fn replace_is_visible_to_the_next_read() {
		let store = TokenStore::new(credential("first"));
		let previous = store.replace(credential("second"));

		assert_eq!(previous.token.expose(), "first");
		assert_eq!(store.current().token.expose(), "second");
	}

	#[test]
	fn valid_at_filters_expired_credentials() {
		let store = TokenStore::new(credential("token"));

		assert!(store.valid_at(macros::datetime!(2025-11-10 12:30 UTC)).is_some());
		assert!(store.valid_at(macros::datetime!(2025-11-10 13:00 UTC)).is_none());
		assert_eq!(store.current().token.expose(), "token");
	}

	#[test]
	fn concurrent_readers_observe_whole_credentials() {
		let store = Arc::new(TokenStore::new(credential("token-0")));
		let writer = {
			let store = store.clone();

			thread::spawn(move || {
				for i in 1..=200_i64 {
					let issued = macros::datetime!(2025-11-10 12:00 UTC) + Duration::seconds(i);

					let next = Credential::new(format!("token-{i}"), issued, Duration::hours(1));

					store.replace(next);
				}
			})
		};
		let readers = (0..4)
			.map(|_| {
				let store = store.clone();

				thread::spawn(move || {
					for _ in 0..500 {
						let current = store.current();
						let seconds = (current.issued_at
							- macros::datetime!(2025-11-10 12:00 UTC))
						.whole_seconds();

						assert_eq!(current.token.expose(), format!("token-{seconds}"));
						assert_eq!(current.valid_until - current.issued_at, Duration::hours(1));
					}
				})
			})
			.collect::<Vec<_>>();

		writer.join().expect("Writer thread should finish.");

		for reader in readers {
			reader.join().expect("Reader thread should finish.");
		}

		assert_eq!(store.current().token.expose(), "token-200");
	}
}
