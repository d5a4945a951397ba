//! Memoised reconciliation results, keyed by rendered document content.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap as HashMap, FxHasher};
use tracing::debug;

use crate::reconcile::Group;

/// Which document a cached result was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
	/// The colour-annotated document.
	Labelled,
	/// The unannotated document, with labels transferred from the labelled one.
	Plain,
}

/// Content hash of a labelled document plus the render mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
	hash: u64,
	mode: RenderMode,
}

impl CacheKey {
	/// Keys the result of rendering `labelled_body` in `mode`.
	pub fn new(labelled_body: &str, mode: RenderMode) -> Self {
		let mut hasher = FxHasher::default();
		labelled_body.hash(&mut hasher);
		Self {
			hash: hasher.finish(),
			mode,
		}
	}

	#[inline]
	pub fn mode(&self) -> RenderMode {
		self.mode
	}
}

type Slot<G> = Arc<Mutex<Option<Arc<[Group<G>]>>>>;

/// Shared store of reconciled group sequences.
///
/// Reads hand out deep copies, so recolouring one expression never affects
/// another built from the same entry. Each key has its own lock: a render in
/// progress only holds back callers asking for the same key.
pub struct RenderCache<G> {
	slots: Mutex<HashMap<CacheKey, Slot<G>>>,
}

impl<G> Default for RenderCache<G> {
	fn default() -> Self {
		Self {
			slots: Mutex::new(HashMap::default()),
		}
	}
}

impl<G: Clone> RenderCache<G> {
	pub fn new() -> Self {
		Self::default()
	}

	fn slot(&self, key: CacheKey) -> Slot<G> {
		Arc::clone(self.slots.lock().entry(key).or_default())
	}

	fn stored(&self, key: &CacheKey) -> Option<Arc<[Group<G>]>> {
		let slot = self.slots.lock().get(key).cloned()?;
		slot.lock().clone()
	}

	/// Returns an independent copy of the groups stored under `key`.
	pub fn get(&self, key: &CacheKey) -> Option<Vec<Group<G>>> {
		self.stored(key).map(|entry| entry.to_vec())
	}

	/// Returns a copy of the groups under `key`, computing and storing them first on a miss.
	///
	/// Only `key`'s slot stays locked while `compute` runs, so each key is
	/// computed at most once even when the cache is shared across threads,
	/// while other keys remain readable and insertable. A failed computation
	/// stores nothing.
	pub fn get_or_try_insert_with<E>(
		&self,
		key: CacheKey,
		compute: impl FnOnce() -> Result<Vec<Group<G>>, E>,
	) -> Result<Vec<Group<G>>, E> {
		let slot = self.slot(key);
		let mut entry = slot.lock();
		if let Some(groups) = entry.as_ref() {
			debug!(?key, "render cache hit");
			return Ok(groups.to_vec());
		}
		debug!(?key, "render cache miss");
		let groups = compute()?;
		*entry = Some(Arc::from(groups.clone()));
		Ok(groups)
	}

	pub fn contains(&self, key: &CacheKey) -> bool {
		self.stored(key).is_some()
	}

	/// Number of stored results.
	pub fn len(&self) -> usize {
		let slots: Vec<Slot<G>> = self.slots.lock().values().cloned().collect();
		slots.iter().filter(|slot| slot.lock().is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every stored result. Renders still in progress keep their slot
	/// and store into it when they finish, but later lookups no longer see it.
	pub fn clear(&self) {
		self.slots.lock().clear();
	}
}

#[cfg(test)]
mod tests {
	use mtex_primitives::{Label, Span};

	use super::*;

	fn group(glyphs: Vec<u8>) -> Group<u8> {
		Group::new(Label::ROOT, glyphs, Span::new(0, 1), "x".to_owned())
	}

	#[test]
	fn keys_separate_modes() {
		let labelled = CacheKey::new("body", RenderMode::Labelled);
		assert_eq!(labelled, CacheKey::new("body", RenderMode::Labelled));
		assert_ne!(labelled, CacheKey::new("body", RenderMode::Plain));
		assert_ne!(labelled, CacheKey::new("other", RenderMode::Labelled));
	}

	#[test]
	fn compute_runs_once_per_key() {
		let cache = RenderCache::new();
		let key = CacheKey::new("body", RenderMode::Labelled);
		let mut calls = 0;
		for _ in 0..3 {
			let groups = cache
				.get_or_try_insert_with::<()>(key, || {
					calls += 1;
					Ok(vec![group(vec![1, 2])])
				})
				.unwrap();
			assert_eq!(groups[0].glyphs(), &[1, 2]);
		}
		assert_eq!(calls, 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn failed_compute_stores_nothing() {
		let cache: RenderCache<u8> = RenderCache::new();
		let key = CacheKey::new("body", RenderMode::Labelled);
		assert_eq!(cache.get_or_try_insert_with(key, || Err("boom")), Err("boom"));
		assert!(cache.is_empty());
		assert!(!cache.contains(&key));
	}

	#[test]
	fn other_keys_stay_usable_during_a_render() {
		let cache = RenderCache::new();
		let outer = CacheKey::new("outer", RenderMode::Labelled);
		let inner = CacheKey::new("inner", RenderMode::Labelled);
		let groups = cache
			.get_or_try_insert_with::<()>(outer, || {
				let nested = cache.get_or_try_insert_with::<()>(inner, || Ok(vec![group(vec![2])]))?;
				assert!(cache.contains(&inner));
				Ok(nested)
			})
			.unwrap();
		assert_eq!(groups[0].glyphs(), &[2]);
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn reads_are_independent_copies() {
		let cache = RenderCache::new();
		let key = CacheKey::new("body", RenderMode::Labelled);
		let mut first = cache
			.get_or_try_insert_with::<()>(key, || Ok(vec![group(vec![1])]))
			.unwrap();
		first[0].glyphs_mut()[0] = 9;
		assert_eq!(cache.get(&key).unwrap()[0].glyphs(), &[1]);
	}
}
