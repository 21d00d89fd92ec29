//! Shared, immutable union schema snapshots

use crate::{Error, Result};
use partcode_adapter_csv::{CsvConfig, CsvReader, read_union_schema};
use partcode_schema::UnionSchema;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// A loaded union schema, cheap to clone and safe to share across threads.
///
/// Reloading builds a new snapshot; holders of the old one keep it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    schema: Arc<UnionSchema>,
}

impl SchemaSnapshot {
    pub fn from_schema(schema: UnionSchema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// Load an artifact with the default CSV settings
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, CsvConfig::default())
    }

    pub fn load_with(path: &Path, config: CsvConfig) -> Result<Self> {
        let reader = CsvReader::new().with_config(config);
        let schema = read_union_schema(&reader, path).map_err(|e| Error::file("load", path, e))?;
        Ok(Self::from_schema(schema))
    }

    pub fn schema(&self) -> &UnionSchema {
        &self.schema
    }

    /// Whether both handles point at the same loaded schema
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema)
    }
}

impl Deref for SchemaSnapshot {
    type Target = UnionSchema;

    fn deref(&self) -> &UnionSchema {
        &self.schema
    }
}

impl From<UnionSchema> for SchemaSnapshot {
    fn from(schema: UnionSchema) -> Self {
        Self::from_schema(schema)
    }
}
