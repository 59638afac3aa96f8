//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	session::{SessionData, SessionFuture, SessionId, SessionStore, SessionStoreError},
};

type StoreMap = Arc<RwLock<HashMap<SessionId, SessionData>>>;

/// Thread-safe storage backend that keeps session records in-process.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(StoreMap);
impl MemorySessionStore {
	fn load_now(map: StoreMap, id: SessionId) -> Option<SessionData> {
		map.read().get(&id).cloned()
	}

	fn save_now(map: StoreMap, id: SessionId, data: SessionData) -> Result<(), SessionStoreError> {
		map.write().insert(id, data);

		Ok(())
	}

	fn clear_now(map: StoreMap, id: SessionId) -> Result<(), SessionStoreError> {
		map.write().remove(&id);

		Ok(())
	}
}
impl SessionStore for MemorySessionStore {
	fn load<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, Option<SessionData>> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::load_now(map, id)) })
	}

	fn save<'a>(&'a self, id: &'a SessionId, data: SessionData) -> SessionFuture<'a, ()> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Self::save_now(map, id, data) })
	}

	fn clear<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, ()> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Self::clear_now(map, id) })
	}
}
