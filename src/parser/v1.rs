//! Legacy v1 collection parser (flat, order-based schema).
//!
//! The v1 export keeps every request in one flat `requests` array. The
//! top-level `order` array and each folder's local `order` array reference
//! requests by ID; declaration order is the order of those arrays, never
//! the order of the flat record set. Nested folders, when present, are
//! expressed through `folders_order` ID lists rather than nesting.

use serde::Deserialize;
use serde_json::Value;

use crate::builder::BuilderOptions;
use crate::headers::should_keep;
use crate::models::{Collection, Folder, KeyValuePair, Request, Response};

use super::error::BuildError;
use super::CollectionParser;

/// Payload modes whose parameters live in the `data` array.
const STRUCTURED_DATA_MODES: &[&str] = &["params", "urlencoded"];

/// Parser for the legacy v1 wire format.
pub struct CollectionV1Parser;

impl CollectionParser for CollectionV1Parser {
    /// Historical behavior: the v1 parser accepts anything. It is the
    /// registry's ordered fallback, so it must be registered last.
    fn can_parse(&self, _contents: &[u8]) -> bool {
        true
    }

    fn parse(&self, contents: &[u8], options: &BuilderOptions) -> Result<Collection, BuildError> {
        let src: CollectionV1 = serde_json::from_slice(contents)?;
        build_collection(&src, options)
    }
}

// Wire-format mirror of the v1 export document. Every field is defaulted:
// real exports omit anything the authoring client considered empty.

#[derive(Debug, Default, Deserialize)]
struct CollectionV1 {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    folders: Vec<FolderV1>,
    #[serde(default)]
    folders_order: Vec<String>,
    #[serde(default)]
    requests: Vec<RequestV1>,
}

#[derive(Debug, Default, Deserialize)]
struct FolderV1 {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    folders_order: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RequestV1 {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "headers")]
    raw_headers: String,
    #[serde(default)]
    url: String,
    #[serde(default, rename = "pathVariables")]
    path_variables: serde_json::Map<String, Value>,
    #[serde(default)]
    method: String,
    #[serde(default)]
    data: Vec<DataV1>,
    #[serde(default, rename = "dataMode")]
    data_mode: String,
    #[serde(default)]
    tests: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "rawModeData")]
    raw_mode_data: String,
    #[serde(default)]
    responses: Vec<ResponseV1>,
}

#[derive(Debug, Default, Deserialize)]
struct DataV1 {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseV1 {
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default, rename = "responseCode")]
    response_code: ResponseCodeV1,
    #[serde(default)]
    headers: Vec<HeaderV1>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseCodeV1 {
    #[serde(default)]
    code: u16,
}

#[derive(Debug, Default, Deserialize)]
struct HeaderV1 {
    #[serde(default)]
    name: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    description: String,
}

fn build_collection(src: &CollectionV1, options: &BuilderOptions) -> Result<Collection, BuildError> {
    let mut collection = Collection {
        name: src.name.clone(),
        description: src.description.clone(),
        ..Collection::default()
    };

    for request_id in &src.order {
        collection
            .requests
            .push(build_request(src, request_id, options)?);
    }

    if src.folders_order.is_empty() {
        // Flat layout: every folder in declared array order.
        for folder in &src.folders {
            collection.folders.push(build_folder(src, folder, options)?);
        }
    } else {
        // Nested layout: the root list names the top-level folders, each
        // folder's own folders_order names its children.
        for folder_id in &src.folders_order {
            let folder = find_folder(src, folder_id)?;
            collection.folders.push(build_folder(src, folder, options)?);
        }
    }

    Ok(collection)
}

fn find_folder<'a>(src: &'a CollectionV1, folder_id: &str) -> Result<&'a FolderV1, BuildError> {
    src.folders
        .iter()
        .find(|folder| folder.id == folder_id)
        .ok_or_else(|| BuildError::FolderNotFound {
            id: folder_id.to_string(),
        })
}

fn build_folder(
    src: &CollectionV1,
    folder: &FolderV1,
    options: &BuilderOptions,
) -> Result<Folder, BuildError> {
    let mut built = Folder {
        id: folder.id.clone(),
        name: folder.name.clone(),
        description: folder.description.clone(),
        ..Folder::default()
    };

    for request_id in &folder.order {
        built.requests.push(build_request(src, request_id, options)?);
    }

    for child_id in &folder.folders_order {
        let child = find_folder(src, child_id)?;
        built.folders.push(build_folder(src, child, options)?);
    }

    Ok(built)
}

fn build_request(
    src: &CollectionV1,
    request_id: &str,
    options: &BuilderOptions,
) -> Result<Request, BuildError> {
    let v1 = src
        .requests
        .iter()
        .find(|request| request.id == request_id)
        .ok_or_else(|| BuildError::RequestNotFound {
            id: request_id.to_string(),
        })?;

    Ok(Request {
        id: v1.id.clone(),
        name: v1.name.clone(),
        description: v1.description.clone(),
        method: v1.method.clone(),
        url: v1.url.clone(),
        tests: v1.tests.clone(),
        payload_type: v1.data_mode.clone(),
        payload_raw: v1.raw_mode_data.clone(),
        payload_params: build_payload_params(v1),
        path_variables: build_path_variables(v1),
        query_params: Vec::new(),
        headers: build_request_headers(v1, options),
        responses: build_responses(v1, options),
    })
}

fn build_payload_params(v1: &RequestV1) -> Vec<KeyValuePair> {
    if !STRUCTURED_DATA_MODES.contains(&v1.data_mode.as_str()) {
        return Vec::new();
    }

    v1.data
        .iter()
        .map(|entry| KeyValuePair::new(entry.key.clone(), entry.value.clone()))
        .collect()
}

fn build_path_variables(v1: &RequestV1) -> Vec<KeyValuePair> {
    v1.path_variables
        .iter()
        .map(|(name, value)| KeyValuePair {
            name: name.clone(),
            key: name.clone(),
            value: value.clone(),
            description: String::new(),
        })
        .collect()
}

/// Parses the raw header block into ordered pairs, applying the deny-list.
///
/// Each line must split on `": "` into exactly two parts; anything else
/// (blank lines, separators, continuation noise) is silently skipped.
fn build_request_headers(v1: &RequestV1, options: &BuilderOptions) -> Vec<KeyValuePair> {
    let mut headers = Vec::new();
    for raw_header in v1.raw_headers.split('\n') {
        let parts: Vec<&str> = raw_header.split(": ").collect();
        if parts.len() != 2 || !should_keep(parts[0], &options.ignored_request_headers) {
            continue;
        }
        headers.push(KeyValuePair::new(parts[0], parts[1]));
    }
    headers
}

fn build_responses(v1: &RequestV1, options: &BuilderOptions) -> Vec<Response> {
    v1.responses
        .iter()
        .map(|response| Response {
            id: response.id.clone(),
            name: response.name.clone(),
            status: response.status.clone(),
            status_code: response.response_code.code,
            body: response.text.clone(),
            headers: build_response_headers(response, options),
            request: None,
        })
        .collect()
}

fn build_response_headers(response: &ResponseV1, options: &BuilderOptions) -> Vec<KeyValuePair> {
    response
        .headers
        .iter()
        .filter(|header| should_keep(&header.name, &options.ignored_response_headers))
        .map(|header| KeyValuePair {
            name: header.name.clone(),
            key: header.key.clone(),
            value: Value::String(header.value.clone()),
            description: header.description.clone(),
        })
        .collect()
}
