use std::collections::HashMap;
use std::sync::RwLock;

use sprig_hash::ObjectId;
use sprig_object::Object;

use crate::{ObjectStore, OdbError};

/// Objects kept in a map. Used for scratch work and tests.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<ObjectId, Object>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.objects.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        let map = self.objects.read().map_err(|_| poisoned())?;
        Ok(map.get(oid).cloned())
    }

    fn contains(&self, oid: &ObjectId) -> bool {
        self.objects
            .read()
            .map(|m| m.contains_key(oid))
            .unwrap_or(false)
    }

    fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        let oid = obj.compute_id()?;
        let mut map = self.objects.write().map_err(|_| poisoned())?;
        map.entry(oid).or_insert_with(|| obj.clone());
        Ok(oid)
    }

    fn lookup_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>, OdbError> {
        let map = self.objects.read().map_err(|_| poisoned())?;
        Ok(map.keys().filter(|oid| oid.starts_with_hex(prefix)).copied().collect())
    }
}

fn poisoned() -> OdbError {
    OdbError::Io(std::io::Error::other("object map lock poisoned"))
}
