//! Record Capability
//!
//! The backing object an inline edit writes to. Records are shared between
//! widgets, so every operation takes `&self`.

use crate::constants::CUSTOM_ATTRIBUTES_KEY;
use crate::domain::field::FieldBinding;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// A persisted domain object with dynamic attributes
pub trait Record {
    /// Stable identity used for edit locking (e.g. `Control:12`)
    fn record_key(&self) -> Arc<str>;

    /// Reload the record from its source of truth
    fn refresh(&self) -> impl Future<Output = Result<()>>;

    /// Persist the record, failing when the write is rejected
    fn save(&self) -> impl Future<Output = Result<()>>;

    /// Read the raw value at `binding` (`Null` when absent)
    fn attr(&self, binding: &FieldBinding) -> Value;

    /// Write the raw value at `binding`
    fn set_attr(&self, binding: &FieldBinding, value: Value);
}

fn binding_path(binding: &FieldBinding) -> Vec<String> {
    match binding {
        FieldBinding::CustomAttribute(id) => vec![CUSTOM_ATTRIBUTES_KEY.to_string(), id.to_string()],
        FieldBinding::Property(path) => path.split('.').map(str::to_string).collect(),
    }
}

/// Read the value a binding addresses inside a JSON document
pub fn read_binding(doc: &Value, binding: &FieldBinding) -> Value {
    let mut current = doc;
    for segment in binding_path(binding) {
        match current.get(segment.as_str()) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Write the value a binding addresses, creating intermediate objects
pub fn write_binding(doc: &mut Value, binding: &FieldBinding, value: Value) {
    write_path(doc, &binding_path(binding), value);
}

fn write_path(target: &mut Value, path: &[String], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        *target = value;
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let slot = map.entry(segment.clone()).or_insert(Value::Null);
        write_path(slot, rest, value);
    }
}

/// A record stored as one JSON document on disk
///
/// `refresh` re-reads the file and `save` rewrites it.
#[derive(Debug)]
pub struct JsonFileRecord {
    key: Arc<str>,
    path: PathBuf,
    doc: Mutex<Value>,
}

impl JsonFileRecord {
    pub async fn open(path: &Path) -> Result<Self> {
        let doc = Self::read(path).await?;
        let key = match (doc.get("type").and_then(Value::as_str), doc.get("id")) {
            (Some(kind), Some(Value::String(id))) => format!("{kind}:{id}"),
            (Some(kind), Some(id)) => format!("{kind}:{id}"),
            _ => path.display().to_string(),
        };

        Ok(Self {
            key: key.into(),
            path: path.to_path_buf(),
            doc: Mutex::new(doc),
        })
    }

    async fn read(path: &Path) -> Result<Value> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Persistence {
                message: format!("{}: {e}", path.display()),
            })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Snapshot of the in-memory document
    pub fn document(&self) -> Value {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Record for JsonFileRecord {
    fn record_key(&self) -> Arc<str> {
        self.key.clone()
    }

    async fn refresh(&self) -> Result<()> {
        let fresh = Self::read(&self.path).await?;
        *self.doc.lock().unwrap_or_else(PoisonError::into_inner) = fresh;
        tracing::debug!("Refreshed {}", self.key);
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.document())?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| Error::Persistence {
                message: format!("{}: {e}", self.path.display()),
            })?;
        tracing::info!("Saved {}", self.key);
        Ok(())
    }

    fn attr(&self, binding: &FieldBinding) -> Value {
        read_binding(&self.doc.lock().unwrap_or_else(PoisonError::into_inner), binding)
    }

    fn set_attr(&self, binding: &FieldBinding, value: Value) {
        let mut doc = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        write_binding(&mut doc, binding, value);
    }
}
