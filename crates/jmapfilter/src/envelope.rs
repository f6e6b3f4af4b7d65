//! Request envelope and method-call types.
//!
//! A JMAP request is a single JSON object carrying the capabilities the
//! client uses and an ordered list of method calls:
//!
//! ```text
//! {"using": ["urn:ietf:params:jmap:core", ...],
//!  "methodCalls": [["Mailbox/get", {...}, "c0"], ...]}
//! ```
//!
//! The server executes calls in list order, so a call may only reference
//! results of calls that come before it.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Core JMAP capability (RFC 8620).
pub const CAPABILITY_CORE: &str = "urn:ietf:params:jmap:core";

/// JMAP mail capability (RFC 8621).
pub const CAPABILITY_MAIL: &str = "urn:ietf:params:jmap:mail";

/// Capabilities declared on every request.
pub const CAPABILITIES: &[&str] = &[CAPABILITY_CORE, CAPABILITY_MAIL];

/// A single method call: name, arguments and call-id.
///
/// Serializes as the 3-element array the protocol expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Method name (e.g. `Email/set`).
    pub name: String,
    /// Named arguments.
    pub arguments: Map<String, Value>,
    /// Caller-assigned id, unique within one envelope.
    pub call_id: String,
}

impl MethodCall {
    /// Creates a call with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
            call_id: call_id.into(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Adds a back-reference argument.
    ///
    /// The key is stored with the `#` prefix that tells the server to
    /// substitute the referenced value.
    #[must_use]
    pub fn reference(mut self, key: &str, reference: &ResultReference) -> Self {
        self.arguments
            .insert(format!("#{key}"), reference.to_value());
        self
    }

    /// Returns an argument by key.
    #[must_use]
    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}

impl Serialize for MethodCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.name, &self.arguments, &self.call_id).serialize(serializer)
    }
}

/// Pointer into the result of an earlier call in the same envelope.
///
/// The server resolves it; the client only builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultReference {
    /// Call-id of the source call.
    pub result_of: String,
    /// Method name of the source call.
    pub name: String,
    /// JSON pointer into the source result.
    pub path: String,
}

impl ResultReference {
    /// Creates a reference into `source`'s result at `path`.
    #[must_use]
    pub fn new(source: &MethodCall, path: impl Into<String>) -> Self {
        Self {
            result_of: source.call_id.clone(),
            name: source.name.clone(),
            path: path.into(),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "path": self.path,
            "resultOf": self.result_of,
        })
    }
}

/// The request envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<'a> {
    /// Declared capabilities.
    pub using: &'static [&'static str],
    /// Calls in execution order.
    pub method_calls: &'a [MethodCall],
}

/// Wraps calls into a request envelope, preserving their order.
#[must_use]
pub const fn wrap(calls: &[MethodCall]) -> Request<'_> {
    Request {
        using: CAPABILITIES,
        method_calls: calls,
    }
}
