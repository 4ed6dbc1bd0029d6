//! Browser-backed collaborators: `localStorage`, a JS notification
//! callback and `Date.now()`.

use mc_editor::{Clock, LogNotifier, Notifier, NotifyLevel, SnapshotStore, StorageError};
use wasm_bindgen::JsValue;

fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

// ─── localStorage ────────────────────────────────────────────────────────

/// `window.localStorage`. Looked up on every call so a page that revokes
/// storage access mid-session degrades instead of holding a dead handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_error(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))
    }
}

impl SnapshotStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?.get_item(key).map_err(|e| StorageError::Read {
            key: key.into(),
            reason: js_error(&e),
        })
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.into(),
            reason: js_error(&e),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Self::storage()?.remove_item(key).map_err(|e| StorageError::Write {
            key: key.into(),
            reason: js_error(&e),
        })
    }
}

// ─── Notifications ───────────────────────────────────────────────────────

/// Calls `callback(message, level)`; without a callback, logs instead.
pub struct JsNotifier {
    callback: Option<js_sys::Function>,
}

impl JsNotifier {
    pub fn new(callback: Option<js_sys::Function>) -> Self {
        Self { callback }
    }
}

impl Notifier for JsNotifier {
    fn notify(&self, message: &str, level: NotifyLevel) {
        let Some(callback) = &self.callback else {
            LogNotifier.notify(message, level);
            return;
        };
        let result = callback.call2(
            &JsValue::NULL,
            &JsValue::from_str(message),
            &JsValue::from_str(level.as_str()),
        );
        if let Err(e) = result {
            log::warn!("notification callback threw: {}", js_error(&e));
        }
    }
}

// ─── Time ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
