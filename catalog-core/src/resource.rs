use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::store::{Collection, Document};
use crate::{CatalogError, CatalogResult};

/// A record type persisted as one flat document.
///
/// The document key is mirrored in the record's `id` field. On read, the
/// key wins when the stored body lacks an `id`.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human label used in messages ("Brand", "Admin", ...).
    const LABEL: &'static str;

    fn id(&self) -> &str;

    fn to_document(&self) -> CatalogResult<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(CatalogError::store(format!(
                "{} serialized to a non-object value: {other}",
                Self::LABEL
            ))),
        }
    }

    fn from_document(collection: Collection, key: &str, mut document: Document) -> CatalogResult<Self> {
        document
            .entry("id")
            .or_insert_with(|| Value::String(key.to_string()));

        serde_json::from_value(Value::Object(document)).map_err(|err| {
            CatalogError::store(format!("Malformed {} document {collection}/{key}: {err}", Self::LABEL))
                .with_source(err)
        })
    }
}

/// Decode a listed collection, failing on the first malformed document.
pub fn decode_all<R: Resource>(collection: Collection, docs: Vec<(String, Document)>) -> CatalogResult<Vec<R>> {
    docs.into_iter()
        .map(|(key, doc)| R::from_document(collection, &key, doc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Tag {
        id: String,
        name: String,
    }

    impl Resource for Tag {
        const LABEL: &'static str = "Tag";

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn key_fills_in_a_missing_id() {
        let doc = json!({"name": "red"}).as_object().cloned().unwrap();
        let tag = Tag::from_document(Collection::Brands, "t1", doc).unwrap();
        assert_eq!(tag, Tag { id: "t1".into(), name: "red".into() });
    }

    #[test]
    fn malformed_documents_are_store_errors() {
        let doc = json!({"id": "t1"}).as_object().cloned().unwrap();
        let err = Tag::from_document(Collection::Brands, "t1", doc).unwrap_err();
        assert!(err.is(crate::ErrorKind::Store));
        assert!(err.message.contains("brands/t1"));
    }

    #[test]
    fn round_trips_through_a_document() {
        let tag = Tag { id: "t2".into(), name: "blue".into() };
        let doc = tag.to_document().unwrap();
        assert_eq!(doc["name"], "blue");
        assert_eq!(Tag::from_document(Collection::Brands, "t2", doc).unwrap(), tag);
    }
}
