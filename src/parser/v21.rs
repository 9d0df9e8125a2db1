//! v2.1 collection parser (nested item tree schema).
//!
//! The v2.1 export is a recursive `item` array: a node carrying a `request`
//! object is a request, any other node is a folder holding its own `item`
//! list. The schema supplies no identifiers for folders, requests, or
//! responses, so fresh v4 UUIDs are assigned at parse time; they are not
//! stable across repeated parses of the same file.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::builder::BuilderOptions;
use crate::headers::should_keep;
use crate::models::{Collection, Folder, KeyValuePair, Request, Response};

use super::error::BuildError;
use super::{looks_like_v2, CollectionParser};

/// Parser for the v2.1 wire format.
pub struct CollectionV21Parser;

impl CollectionParser for CollectionV21Parser {
    /// Accepts content whose `info.schema` names a v2 collection schema,
    /// or which carries a top-level `item` array.
    fn can_parse(&self, contents: &[u8]) -> bool {
        looks_like_v2(contents)
    }

    fn parse(&self, contents: &[u8], options: &BuilderOptions) -> Result<Collection, BuildError> {
        let src: CollectionV21 = serde_json::from_slice(contents)?;
        Ok(build_collection(&src, options))
    }
}

// Wire-format mirror of the v2.1 export document.

#[derive(Debug, Default, Deserialize)]
struct CollectionV21 {
    #[serde(default)]
    info: InfoV21,
    #[serde(default)]
    item: Vec<ItemV21>,
}

#[derive(Debug, Default, Deserialize)]
struct InfoV21 {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct ItemV21 {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    event: Vec<EventV21>,
    #[serde(default)]
    item: Vec<ItemV21>,
    #[serde(default)]
    request: Option<RequestDetailsV21>,
    #[serde(default)]
    response: Vec<ResponseV21>,
}

#[derive(Debug, Default, Deserialize)]
struct RequestDetailsV21 {
    #[serde(default)]
    method: String,
    #[serde(default)]
    header: Vec<PairV21>,
    #[serde(default)]
    body: BodyV21,
    #[serde(default)]
    url: UrlV21,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct BodyV21 {
    #[serde(default)]
    mode: String,
    #[serde(default)]
    raw: String,
    #[serde(default)]
    formdata: Vec<PairV21>,
    #[serde(default)]
    urlencoded: Vec<PairV21>,
}

#[derive(Debug, Default, Deserialize)]
struct UrlV21 {
    #[serde(default)]
    raw: String,
    #[serde(default)]
    variable: Vec<PairV21>,
    #[serde(default)]
    query: Vec<PairV21>,
}

#[derive(Debug, Default, Deserialize)]
struct EventV21 {
    #[serde(default)]
    listen: String,
    #[serde(default)]
    script: ScriptV21,
}

#[derive(Debug, Default, Deserialize)]
struct ScriptV21 {
    #[serde(default)]
    exec: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseV21 {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    code: u16,
    #[serde(default)]
    header: Vec<PairV21>,
    #[serde(default, rename = "originalRequest")]
    original_request: Option<RequestDetailsV21>,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Default, Deserialize)]
struct PairV21 {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    description: String,
}

fn build_collection(src: &CollectionV21, options: &BuilderOptions) -> Collection {
    let mut root = Folder::default();
    compute_items(&mut root, &src.item, options);

    Collection {
        name: src.info.name.clone(),
        description: src.info.description.clone(),
        requests: root.requests,
        folders: root.folders,
        structures: Vec::new(),
    }
}

/// Depth-first descent over an `item` list, appending folders and requests
/// to the parent in declared order.
fn compute_items(parent: &mut Folder, items: &[ItemV21], options: &BuilderOptions) {
    for item in items {
        match &item.request {
            None => {
                let mut folder = Folder {
                    id: fresh_id(),
                    name: item.name.clone(),
                    description: item.description.clone(),
                    ..Folder::default()
                };
                compute_items(&mut folder, &item.item, options);
                parent.folders.push(folder);
            }
            Some(details) => {
                parent.requests.push(build_request(item, details, options));
            }
        }
    }
}

fn build_request(item: &ItemV21, details: &RequestDetailsV21, options: &BuilderOptions) -> Request {
    Request {
        id: fresh_id(),
        name: item.name.clone(),
        tests: extract_tests(item),
        responses: build_responses(item, options),
        ..request_from_details(details, options)
    }
}

/// Builds the request fields derivable from a `request` object alone.
///
/// Shared between live requests and the `originalRequest` snapshots
/// embedded in responses, so both go through identical header and
/// parameter extraction.
fn request_from_details(details: &RequestDetailsV21, options: &BuilderOptions) -> Request {
    Request {
        description: details.description.clone(),
        method: details.method.clone(),
        url: details.url.raw.clone(),
        payload_type: details.body.mode.clone(),
        payload_raw: details.body.raw.clone(),
        payload_params: build_payload_params(details),
        path_variables: convert_pairs(&details.url.variable),
        query_params: convert_pairs(&details.url.query),
        headers: build_headers(&details.header, &options.ignored_request_headers),
        ..Request::default()
    }
}

/// Returns the script source of the first `test` event, lines joined with
/// newlines. Absence yields an empty script.
fn extract_tests(item: &ItemV21) -> String {
    item.event
        .iter()
        .find(|event| event.listen == "test")
        .map(|event| event.script.exec.join("\n"))
        .unwrap_or_default()
}

fn build_payload_params(details: &RequestDetailsV21) -> Vec<KeyValuePair> {
    let pairs = match details.body.mode.as_str() {
        "urlencoded" => &details.body.urlencoded,
        "formdata" => &details.body.formdata,
        _ => return Vec::new(),
    };
    convert_pairs(pairs)
}

fn convert_pairs(pairs: &[PairV21]) -> Vec<KeyValuePair> {
    pairs
        .iter()
        .map(|pair| KeyValuePair {
            name: pair.key.clone(),
            key: pair.key.clone(),
            value: pair.value.clone(),
            description: pair.description.clone(),
        })
        .collect()
}

fn build_headers(headers: &[PairV21], deny_list: &[String]) -> Vec<KeyValuePair> {
    headers
        .iter()
        .filter(|header| should_keep(&header.key, deny_list))
        .map(|header| KeyValuePair {
            name: header.key.clone(),
            key: header.key.clone(),
            value: header.value.clone(),
            description: header.description.clone(),
        })
        .collect()
}

fn build_responses(item: &ItemV21, options: &BuilderOptions) -> Vec<Response> {
    item.response
        .iter()
        .map(|response| Response {
            id: fresh_id(),
            name: response.name.clone(),
            status: response.status.clone(),
            status_code: response.code,
            body: response.body.clone(),
            headers: build_headers(&response.header, &options.ignored_response_headers),
            request: response
                .original_request
                .as_ref()
                .map(|details| Box::new(request_from_details(details, options))),
        })
        .collect()
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Collection {
        CollectionV21Parser
            .parse(contents.as_bytes(), &BuilderOptions::default())
            .unwrap()
    }

    #[test]
    fn test_item_without_request_is_a_folder() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [
                    {"name": "Books", "item": [
                        {"name": "List books", "request": {"method": "GET", "url": {"raw": "http://x/books"}}}
                    ]},
                    {"name": "Ping", "request": {"method": "GET", "url": {"raw": "http://x/ping"}}}
                ]
            }"#,
        );

        assert_eq!(collection.folders.len(), 1);
        assert_eq!(collection.folders[0].name, "Books");
        assert_eq!(collection.folders[0].requests.len(), 1);
        assert_eq!(collection.requests.len(), 1);
        assert_eq!(collection.requests[0].name, "Ping");
    }

    #[test]
    fn test_generated_ids_are_fresh_and_unique() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [
                    {"name": "a", "request": {"method": "GET", "url": {"raw": "http://x"}}},
                    {"name": "b", "request": {"method": "GET", "url": {"raw": "http://x"}}}
                ]
            }"#,
        );

        let first = &collection.requests[0].id;
        let second = &collection.requests[1].id;
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn test_tests_taken_from_first_test_event() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{
                    "name": "r",
                    "event": [
                        {"listen": "prerequest", "script": {"exec": ["setup();"]}},
                        {"listen": "test", "script": {"exec": ["var a = 1;", "var b = 2;"]}},
                        {"listen": "test", "script": {"exec": ["ignored();"]}}
                    ],
                    "request": {"method": "GET", "url": {"raw": "http://x"}}
                }]
            }"#,
        );

        assert_eq!(collection.requests[0].tests, "var a = 1;\nvar b = 2;");
    }

    #[test]
    fn test_missing_test_event_yields_empty_script() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{"name": "r", "request": {"method": "GET", "url": {"raw": "http://x"}}}]
            }"#,
        );

        assert_eq!(collection.requests[0].tests, "");
    }

    #[test]
    fn test_missing_response_array_yields_empty_vec() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{"name": "r", "request": {"method": "GET", "url": {"raw": "http://x"}}}]
            }"#,
        );

        assert!(collection.requests[0].responses.is_empty());
    }

    #[test]
    fn test_url_query_and_path_variables_extracted() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{
                    "name": "r",
                    "request": {
                        "method": "GET",
                        "url": {
                            "raw": "http://x/books/:id?limit=10",
                            "variable": [{"key": "id", "value": "7", "description": "book id"}],
                            "query": [{"key": "limit", "value": "10"}]
                        }
                    }
                }]
            }"#,
        );

        let request = &collection.requests[0];
        assert_eq!(request.path_variables.len(), 1);
        assert_eq!(request.path_variables[0].name, "id");
        assert_eq!(request.path_variables[0].description, "book id");
        assert_eq!(request.query_params.len(), 1);
        assert_eq!(request.query_params[0].name, "limit");
    }

    #[test]
    fn test_payload_params_follow_body_mode() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{
                    "name": "r",
                    "request": {
                        "method": "POST",
                        "url": {"raw": "http://x"},
                        "body": {
                            "mode": "formdata",
                            "formdata": [{"key": "title", "value": "Dune"}],
                            "urlencoded": [{"key": "ignored", "value": "y"}]
                        }
                    }
                }]
            }"#,
        );

        let params = &collection.requests[0].payload_params;
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].key, "title");
    }

    #[test]
    fn test_non_string_pair_values_survive() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{
                    "name": "r",
                    "request": {
                        "method": "GET",
                        "url": {
                            "raw": "http://x",
                            "query": [{"key": "limit", "value": 10}, {"key": "all", "value": null}]
                        }
                    }
                }]
            }"#,
        );

        let params = &collection.requests[0].query_params;
        assert_eq!(params[0].value, serde_json::json!(10));
        assert_eq!(params[1].value, serde_json::Value::Null);
    }

    #[test]
    fn test_response_carries_original_request_snapshot() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{
                    "name": "r",
                    "request": {"method": "GET", "url": {"raw": "http://x/books"}},
                    "response": [{
                        "name": "ok",
                        "status": "OK",
                        "code": 200,
                        "body": "[]",
                        "header": [{"key": "Content-Type", "value": "application/json"}],
                        "originalRequest": {
                            "method": "GET",
                            "url": {"raw": "http://x/books?limit=5", "query": [{"key": "limit", "value": "5"}]},
                            "header": [{"key": "Accept", "value": "*/*"}]
                        }
                    }]
                }]
            }"#,
        );

        let response = &collection.requests[0].responses[0];
        assert_eq!(response.status_code, 200);
        assert!(!response.id.is_empty());

        let snapshot = response.request.as_ref().unwrap();
        assert_eq!(snapshot.url, "http://x/books?limit=5");
        assert_eq!(snapshot.query_params.len(), 1);
        assert_eq!(snapshot.headers.len(), 1);
        assert_eq!(snapshot.headers[0].name, "Accept");
    }

    #[test]
    fn test_snapshot_headers_respect_request_deny_list() {
        let options = BuilderOptions {
            ignored_request_headers: vec!["Authorization".to_string()],
            ..BuilderOptions::default()
        };
        let collection = CollectionV21Parser
            .parse(
                r#"{
                    "info": {"name": "x"},
                    "item": [{
                        "name": "r",
                        "request": {
                            "method": "GET",
                            "url": {"raw": "http://x"},
                            "header": [{"key": "Authorization", "value": "token"}]
                        },
                        "response": [{
                            "name": "ok", "status": "OK", "code": 200, "body": "",
                            "originalRequest": {
                                "method": "GET",
                                "url": {"raw": "http://x"},
                                "header": [{"key": "Authorization", "value": "token"}]
                            }
                        }]
                    }]
                }"#
                .as_bytes(),
                &options,
            )
            .unwrap();

        assert!(collection.requests[0].headers.is_empty());
        let snapshot = collection.requests[0].responses[0].request.as_ref().unwrap();
        assert!(snapshot.headers.is_empty());
    }

    #[test]
    fn test_deeply_nested_folders() {
        let collection = parse(
            r#"{
                "info": {"name": "x"},
                "item": [{
                    "name": "l1",
                    "item": [{
                        "name": "l2",
                        "item": [{"name": "leaf", "request": {"method": "GET", "url": {"raw": "http://x"}}}]
                    }]
                }]
            }"#,
        );

        let l1 = &collection.folders[0];
        let l2 = &l1.folders[0];
        assert_eq!(l2.name, "l2");
        assert_eq!(l2.requests[0].name, "leaf");
    }
}
