//! OpenSearch request body builders.

use serde_json::{json, Value};

use crate::types::RawDocument;

/// Build a full-text `match` query on a single field.
///
/// The query text is analysed with the field's own analyzer, so it matches
/// on tokens rather than substrings.
pub fn build_match_query(field: &str, text: &str, size: usize) -> Value {
    json!({
        "query": {
            "match": {
                field: text
            }
        },
        "size": size
    })
}

/// Build the first request of a full scan.
///
/// Sorting on `_doc` is the cheapest order for scrolling and has no relevance cost.
pub fn build_scan_query(page_size: usize) -> Value {
    json!({
        "query": {
            "match_all": {}
        },
        "sort": ["_doc"],
        "size": page_size
    })
}

/// Build the body that fetches the next page of a scroll.
pub fn build_scroll_continue(cursor: &str, keep_alive: &str) -> Value {
    json!({
        "scroll": keep_alive,
        "scroll_id": cursor
    })
}

/// Build the body that releases a scroll cursor.
pub fn build_scroll_clear(cursor: &str) -> Value {
    json!({
        "scroll_id": [cursor]
    })
}

/// Build a partial update body.
pub fn build_partial_update(changes: &Value) -> Value {
    json!({ "doc": changes })
}

/// Build the action/document line pairs of a bulk index request.
pub fn build_bulk_index_lines(collection: &str, documents: &[RawDocument]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        lines.push(json!({ "index": { "_index": collection, "_id": document.id } }));
        lines.push(document.source.clone());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query() {
        let query = build_match_query("name", "张", 10);

        assert_eq!(query["query"]["match"]["name"], "张");
        assert_eq!(query["size"], 10);
    }

    #[test]
    fn test_scan_query() {
        let query = build_scan_query(500);

        assert!(query["query"]["match_all"].is_object());
        assert_eq!(query["sort"][0], "_doc");
        assert_eq!(query["size"], 500);
    }

    #[test]
    fn test_scroll_bodies() {
        assert_eq!(
            build_scroll_continue("abc", "1m"),
            json!({ "scroll": "1m", "scroll_id": "abc" })
        );
        assert_eq!(build_scroll_clear("abc"), json!({ "scroll_id": ["abc"] }));
    }

    #[test]
    fn test_bulk_lines_pair_action_and_source() {
        let documents = vec![
            RawDocument::new("p1002", json!({ "id": "p1002", "name": "李四" })),
            RawDocument::new("p1003", json!({ "id": "p1003", "name": "王五" })),
        ];

        let lines = build_bulk_index_lines("person", &documents);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["index"]["_index"], "person");
        assert_eq!(lines[0]["index"]["_id"], "p1002");
        assert_eq!(lines[1]["name"], "李四");
        assert_eq!(lines[2]["index"]["_id"], "p1003");
    }

    #[test]
    fn test_partial_update() {
        let body = build_partial_update(&json!({ "name": "张三三" }));

        assert_eq!(body, json!({ "doc": { "name": "张三三" } }));
    }
}
