use super::KeyValueBackend;
use crate::error::BackendError;
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Backend over the browser's `localStorage`.
///
/// Each document lives under its own `localStorage` key. Quota errors surface
/// from `set` as [`BackendError::Unavailable`].
pub struct LocalStorageBackend {
    storage: Storage,
}

impl LocalStorageBackend {
    /// Use `window.localStorage`.
    pub fn new() -> Result<Self, BackendError> {
        let storage = web_sys::window()
            .ok_or_else(|| BackendError::Unavailable("no window object".into()))?
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| BackendError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }

    /// Wrap an existing storage object, e.g. `sessionStorage`.
    pub fn from_storage(storage: Storage) -> Self {
        Self { storage }
    }
}

fn js_error(err: JsValue) -> BackendError {
    BackendError::Unavailable(format!("{:?}", err))
}

impl KeyValueBackend for LocalStorageBackend {
    type Key = str;

    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        self.storage.set_item(key, &value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}
