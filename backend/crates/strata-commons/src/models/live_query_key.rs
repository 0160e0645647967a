//! Storage key of a persisted live query registration.

use crate::models::{DatabaseId, LiveQueryId, NamespaceId, TableName};
use crate::storage_key::{
    decode_key, encode_key, encode_prefix, escape_component as esc, unescape_component,
    StorageKey,
};

/// Leading tag of every live query key, keeps the keyspace disjoint from any
/// other record sharing the partition.
pub const LIVE_QUERY_KEY_TAG: &str = "lv";

/// Key of one live query registration on one watched table.
///
/// Storage format: storekey tuple `("lv", ns, db, table, live_id)` with every
/// component escaped. Because the tuple encoding is order preserving and the
/// escaped components are NUL-free, every registration
/// watching a table sorts under [`LiveQueryKey::table_prefix`], and distinct
/// tuples never collide. The same key is built for put and for delete so a
/// delete always targets exactly what a put created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveQueryKey {
    namespace_id: NamespaceId,
    database_id: DatabaseId,
    table_name: TableName,
    live_id: LiveQueryId,
}

impl LiveQueryKey {
    pub fn new(
        namespace_id: NamespaceId,
        database_id: DatabaseId,
        table_name: TableName,
        live_id: LiveQueryId,
    ) -> Self {
        Self {
            namespace_id,
            database_id,
            table_name,
            live_id,
        }
    }

    /// Prefix shared by all live query keys of one table.
    pub fn table_prefix(ns: &NamespaceId, db: &DatabaseId, table: &TableName) -> Vec<u8> {
        encode_prefix(&(
            LIVE_QUERY_KEY_TAG,
            esc(ns.as_str()),
            esc(db.as_str()),
            esc(table.as_str()),
        ))
    }

    pub fn namespace_id(&self) -> &NamespaceId {
        &self.namespace_id
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.database_id
    }

    pub fn table_name(&self) -> &TableName {
        &self.table_name
    }

    pub fn live_id(&self) -> &LiveQueryId {
        &self.live_id
    }
}

impl StorageKey for LiveQueryKey {
    fn storage_key(&self) -> Vec<u8> {
        encode_key(&(
            LIVE_QUERY_KEY_TAG,
            esc(self.namespace_id.as_str()),
            esc(self.database_id.as_str()),
            esc(self.table_name.as_str()),
            esc(self.live_id.as_str()),
        ))
    }

    fn from_storage_key(bytes: &[u8]) -> Result<Self, String> {
        let (tag, ns, db, tb, lv): (String, String, String, String, String) = decode_key(bytes)?;
        if tag != LIVE_QUERY_KEY_TAG {
            return Err(format!("Not a live query key (tag '{}')", tag));
        }
        Ok(Self::new(
            NamespaceId::new(unescape_component(&ns)?),
            DatabaseId::new(unescape_component(&db)?),
            TableName::new(unescape_component(&tb)?),
            LiveQueryId::new(unescape_component(&lv)?),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ns: &str, db: &str, tb: &str, lv: &str) -> LiveQueryKey {
        LiveQueryKey::new(
            NamespaceId::new(ns),
            DatabaseId::new(db),
            TableName::new(tb),
            LiveQueryId::new(lv),
        )
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(
            key("app", "main", "person", "a1").storage_key(),
            key("app", "main", "person", "a1").storage_key()
        );
    }

    #[test]
    fn test_component_boundaries_do_not_collide() {
        // Naive concatenation would map both of these to "abc"
        let a = key("ab", "c", "t", "1").storage_key();
        let b = key("a", "bc", "t", "1").storage_key();
        assert_ne!(a, b);

        // A NUL inside a component must not read as a terminator
        let a = key("a\0b", "c", "t", "1").storage_key();
        let b = key("a", "b\0c", "t", "1").storage_key();
        assert_ne!(a, b);
    }

    #[test]
    fn test_nul_components_roundtrip_and_stay_under_prefix() {
        let original = key("a\0b", "main\u{1}", "person", "x\0");
        let decoded = LiveQueryKey::from_storage_key(&original.storage_key()).unwrap();
        assert_eq!(decoded, original);

        let prefix = LiveQueryKey::table_prefix(
            &NamespaceId::new("a"),
            &DatabaseId::new("b\0main\u{1}"),
            &TableName::new("person"),
        );
        assert!(!original.storage_key().starts_with(&prefix));
    }

    #[test]
    fn test_decode_roundtrip() {
        let original = key("app", "main", "person", "a1");
        let decoded = LiveQueryKey::from_storage_key(&original.storage_key()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_table_prefix_matches_only_that_table() {
        let ns = NamespaceId::new("app");
        let db = DatabaseId::new("main");
        let prefix = LiveQueryKey::table_prefix(&ns, &db, &TableName::new("person"));

        assert!(key("app", "main", "person", "a1").storage_key().starts_with(&prefix));
        assert!(!key("app", "main", "personal", "a1").storage_key().starts_with(&prefix));
        assert!(!key("app", "other", "person", "a1").storage_key().starts_with(&prefix));
    }
}
