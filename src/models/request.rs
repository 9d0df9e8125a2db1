//! Request, response, and key/value pair models.
//!
//! These are the leaf entities of the normalized document. Requests keep
//! their raw test-script source so the structure extractor can mine it
//! later; responses in the v2.1 schema carry a denormalized snapshot of the
//! request that produced them so documentation of example responses is
//! self-contained.

use serde::{Deserialize, Serialize};
use url::Url;

/// A single API request in the normalized model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request identifier. Taken from the source document (v1) or freshly
    /// generated at parse time (v2.1 supplies none).
    pub id: String,

    /// Request display name.
    pub name: String,

    /// Request description, usually markdown.
    pub description: String,

    /// HTTP method as written in the source document (e.g. "GET").
    pub method: String,

    /// Raw request URL, possibly still containing `:pathVariable` tokens.
    pub url: String,

    /// Raw test-script source attached to the request. Consumed only by
    /// the structure extractor; never executed as an actual test here.
    pub tests: String,

    /// Declared payload mode (e.g. "raw", "params", "urlencoded",
    /// "formdata"). Empty when the request has no body.
    pub payload_type: String,

    /// Raw payload body for non-structured payload modes.
    pub payload_raw: String,

    /// Structured payload parameters, in declared order.
    pub payload_params: Vec<KeyValuePair>,

    /// Path variables (`:id` style), in declared order.
    pub path_variables: Vec<KeyValuePair>,

    /// Query parameters, in declared order. Only populated by the v2.1
    /// schema; the v1 schema keeps the query string inside `url`.
    pub query_params: Vec<KeyValuePair>,

    /// Request headers after deny-list filtering, in declared order.
    pub headers: Vec<KeyValuePair>,

    /// Example responses recorded for this request, in declared order.
    /// Always present, empty when the source document has none.
    pub responses: Vec<Response>,
}

impl Request {
    /// Parses the raw request URL into a [`Url`].
    ///
    /// # Returns
    ///
    /// The parsed URL, or the underlying parse error when the raw value is
    /// not a valid absolute URL (common when it still contains unresolved
    /// `{{variable}}` placeholders).
    pub fn parsed_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }
}

/// An example response attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response identifier. Taken from the source document (v1) or freshly
    /// generated at parse time (v2.1 supplies none).
    pub id: String,

    /// Response display name.
    pub name: String,

    /// Status line text (e.g. "OK").
    pub status: String,

    /// Numeric HTTP status code.
    pub status_code: u16,

    /// Raw response body.
    pub body: String,

    /// Response headers after deny-list filtering, in declared order.
    pub headers: Vec<KeyValuePair>,

    /// Snapshot of the request that produced this response.
    ///
    /// Only the v2.1 schema records this (`originalRequest`). The
    /// duplication with the owning [`Request`] is intentional: example
    /// responses are rendered self-contained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Box<Request>>,
}

/// An ordered name/value entry used for headers, query parameters, payload
/// parameters, and path variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePair {
    /// Display name of the entry.
    pub name: String,

    /// Source wire key. Populated identically to `name` by both parsers
    /// today, but kept distinct to preserve the source field.
    pub key: String,

    /// Entry value. Weakly typed: v2.1 documents may carry non-string
    /// values here (numbers, booleans, null from disabled rows).
    pub value: serde_json::Value,

    /// Entry description, when the source document provides one.
    pub description: String,
}

impl KeyValuePair {
    /// Creates a pair whose `name` and `key` are the same string, the way
    /// both supported schemas populate them.
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            value: value.into(),
            description: String::new(),
        }
    }
}
