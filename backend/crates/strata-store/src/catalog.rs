//! Catalog of namespaces, databases and tables.
//!
//! The permission gate only needs lookups, so the [`Catalog`] trait is
//! read-only. [`StoreCatalog`] keeps definitions as JSON values in a dedicated
//! partition of a [`StorageBackend`] and adds the `define_*` writers used by
//! DDL execution and tests.

use crate::storage_trait::{Partition, Result, StorageBackend};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use strata_commons::{
    encode_key, escape_component as esc, DatabaseDefinition, DatabaseId, NamespaceDefinition, NamespaceId,
    TableDefinition, TableName,
};

/// Default partition holding catalog definitions.
pub const CATALOG_PARTITION: &str = "catalog";

/// Read access to catalog definitions.
pub trait Catalog: Send + Sync {
    fn get_namespace(&self, ns: &NamespaceId) -> Result<Option<NamespaceDefinition>>;

    fn get_database(
        &self,
        ns: &NamespaceId,
        db: &DatabaseId,
    ) -> Result<Option<DatabaseDefinition>>;

    fn get_table(
        &self,
        ns: &NamespaceId,
        db: &DatabaseId,
        table: &TableName,
    ) -> Result<Option<TableDefinition>>;
}

pub struct StoreCatalog {
    backend: Arc<dyn StorageBackend>,
    partition: Partition,
}

impl StoreCatalog {
    /// Create a catalog over `backend`, creating its partition if needed.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let partition = Partition::new(CATALOG_PARTITION);
        backend.create_partition(&partition)?;
        Ok(Self { backend, partition })
    }

    pub fn define_namespace(&self, def: &NamespaceDefinition) -> Result<()> {
        self.write(&Self::namespace_key(&def.name), def)
    }

    pub fn define_database(&self, def: &DatabaseDefinition) -> Result<()> {
        self.write(&Self::database_key(&def.namespace_id, &def.name), def)
    }

    pub fn define_table(&self, def: &TableDefinition) -> Result<()> {
        self.write(
            &Self::table_key(&def.namespace_id, &def.database_id, &def.name),
            def,
        )
    }

    fn namespace_key(ns: &NamespaceId) -> Vec<u8> {
        encode_key(&("ns", esc(ns.as_str())))
    }

    fn database_key(ns: &NamespaceId, db: &DatabaseId) -> Vec<u8> {
        encode_key(&("db", esc(ns.as_str()), esc(db.as_str())))
    }

    fn table_key(ns: &NamespaceId, db: &DatabaseId, table: &TableName) -> Vec<u8> {
        encode_key(&(
            "tb",
            esc(ns.as_str()),
            esc(db.as_str()),
            esc(table.as_str()),
        ))
    }

    fn write<T: Serialize>(&self, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.put(&self.partition, key, &bytes)
    }

    fn read<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.backend.get(&self.partition, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl Catalog for StoreCatalog {
    fn get_namespace(&self, ns: &NamespaceId) -> Result<Option<NamespaceDefinition>> {
        self.read(&Self::namespace_key(ns))
    }

    fn get_database(
        &self,
        ns: &NamespaceId,
        db: &DatabaseId,
    ) -> Result<Option<DatabaseDefinition>> {
        self.read(&Self::database_key(ns, db))
    }

    fn get_table(
        &self,
        ns: &NamespaceId,
        db: &DatabaseId,
        table: &TableName,
    ) -> Result<Option<TableDefinition>> {
        self.read(&Self::table_key(ns, db, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryBackend;
    use strata_commons::{PermissionExpression, PermissionRule, TablePermissions};

    #[test]
    fn test_define_and_lookup() {
        let catalog = StoreCatalog::new(Arc::new(InMemoryBackend::new())).unwrap();
        let ns = NamespaceId::new("app");
        let db = DatabaseId::new("main");
        let tb = TableName::new("person");

        assert!(catalog.get_namespace(&ns).unwrap().is_none());

        catalog
            .define_namespace(&NamespaceDefinition { name: ns.clone() })
            .unwrap();
        catalog
            .define_database(&DatabaseDefinition {
                namespace_id: ns.clone(),
                name: db.clone(),
            })
            .unwrap();
        let table = TableDefinition::new(
            ns.clone(),
            db.clone(),
            tb.clone(),
            TablePermissions::Expression(PermissionExpression::uniform(PermissionRule::Full)),
        );
        catalog.define_table(&table).unwrap();

        assert!(catalog.get_namespace(&ns).unwrap().is_some());
        assert!(catalog.get_database(&ns, &db).unwrap().is_some());
        assert_eq!(catalog.get_table(&ns, &db, &tb).unwrap(), Some(table));
        assert!(catalog
            .get_table(&ns, &db, &TableName::new("other"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_nul_in_names_does_not_alias_tables() {
        let catalog = StoreCatalog::new(Arc::new(InMemoryBackend::new())).unwrap();
        let open = TableDefinition::new(
            NamespaceId::new("a\0b"),
            DatabaseId::new("c"),
            TableName::new("t"),
            TablePermissions::Expression(PermissionExpression::uniform(PermissionRule::Full)),
        );
        catalog.define_table(&open).unwrap();

        let other = catalog
            .get_table(&NamespaceId::new("a"), &DatabaseId::new("b\0c"), &TableName::new("t"))
            .unwrap();
        assert!(other.is_none());
        assert_eq!(
            catalog
                .get_table(&NamespaceId::new("a\0b"), &DatabaseId::new("c"), &TableName::new("t"))
                .unwrap(),
            Some(open)
        );
    }
}
