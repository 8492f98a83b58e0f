//! Thread-safe per-account cache of resolved locations.

// self
use crate::{
	_prelude::*,
	auth::AccountId,
	location::ResolvedLocation,
};

type CacheMap = Arc<RwLock<HashMap<AccountId, ResolvedLocation>>>;

/// Latest [`ResolvedLocation`] per account.
///
/// Clones share the same underlying map, so a cache can be handed to several
/// resolvers. Entries live until replaced or removed.
#[derive(Clone, Debug, Default)]
pub struct LocationCache(CacheMap);
impl LocationCache {
	/// Stores `location`, returning the entry it replaced.
	pub fn store(&self, location: ResolvedLocation) -> Option<ResolvedLocation> {
		self.0.write().insert(location.account.clone(), location)
	}

	/// Returns the cached location for `account`, if any.
	pub fn get(&self, account: &str) -> Option<ResolvedLocation> {
		self.0.read().get(account).cloned()
	}

	/// Removes the cached location for `account`.
	pub fn remove(&self, account: &str) -> Option<ResolvedLocation> {
		self.0.write().remove(account)
	}

	/// Drops every cached entry.
	pub fn clear(&self) {
		self.0.write().clear();
	}

	/// Number of cached accounts.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
