//! Per-attempt raw profile memo with singleflight lookups.

// self
use crate::{
	_prelude::*,
	auth::AttemptId,
	identity::RawProfile,
	obs::{self, ProfileLookup},
};

type Slot = Arc<AsyncMutex<Option<RawProfile>>>;

/// Per-attempt raw profile memo.
///
/// Every attempt gets its own async lock, so concurrent lookups for one attempt share a single
/// fetch while different attempts never wait on each other. A failed fetch is not cached: its
/// entry is dropped unless another lookup is already waiting on it, and the next lookup fetches
/// again.
#[derive(Clone, Debug, Default)]
pub struct ProfileCache {
	slots: Arc<Mutex<HashMap<AttemptId, Slot>>>,
}
impl ProfileCache {
	/// Returns the cached profile for `attempt`, running `fetch` on the first lookup.
	pub async fn get_or_fetch<F, Fut>(&self, attempt: &AttemptId, fetch: F) -> Result<RawProfile>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<RawProfile>>,
	{
		let slot = self.slot(attempt);
		let mut cached = slot.lock().await;

		if let Some(profile) = cached.as_ref() {
			obs::record_profile_lookup(ProfileLookup::Hit);

			return Ok(profile.clone());
		}

		obs::record_profile_lookup(ProfileLookup::Fetch);

		match fetch().await {
			Ok(profile) => {
				*cached = Some(profile.clone());

				Ok(profile)
			},
			Err(err) => {
				drop(cached);
				self.release_failed(attempt, &slot);

				Err(err)
			},
		}
	}

	/// Drops the entry for `attempt`; returns whether one existed.
	pub fn forget(&self, attempt: &AttemptId) -> bool {
		self.slots.lock().remove(attempt).is_some()
	}

	/// Returns true when `attempt` has an entry (fetched or in flight).
	pub fn contains(&self, attempt: &AttemptId) -> bool {
		self.slots.lock().contains_key(attempt)
	}

	/// Number of tracked attempts.
	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	/// Returns true when no attempt is tracked.
	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}

	fn release_failed(&self, attempt: &AttemptId, slot: &Slot) {
		let mut slots = self.slots.lock();

		// Map entry plus the caller's handle; any extra holder is a waiting lookup.
		if slots.get(attempt).is_some_and(|current| Arc::ptr_eq(current, slot))
			&& Arc::strong_count(slot) == 2
		{
			slots.remove(attempt);
		}
	}

	fn slot(&self, attempt: &AttemptId) -> Slot {
		let mut slots = self.slots.lock();

		slots.entry(attempt.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(None))).clone()
	}
}
