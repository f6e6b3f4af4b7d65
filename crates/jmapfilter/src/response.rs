//! Response envelope and per-method result types.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Method name the server uses for method-level errors.
pub const ERROR_METHOD: &str = "error";

/// A single method response: name, result and the originating call-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodResponse {
    /// Method name (or `error`).
    pub name: String,
    /// Result payload.
    pub result: Value,
    /// Call-id of the call this answers.
    pub call_id: String,
}

impl MethodResponse {
    /// Creates a response triple.
    #[must_use]
    pub fn new(name: impl Into<String>, result: Value, call_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result,
            call_id: call_id.into(),
        }
    }

    /// Returns true if this is a method-level error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.name == ERROR_METHOD
    }

    /// Parses the method-level error, if this is one.
    #[must_use]
    pub fn error(&self) -> Option<MethodError> {
        if !self.is_error() {
            return None;
        }
        serde_json::from_value(self.result.clone()).ok()
    }

    /// Returns the `list` field of a `/get` result.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if `list` is missing or not an array.
    pub fn list(&self) -> Result<&[Value]> {
        self.result
            .get("list")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::protocol(format!("{} response has no list", self.name)))
    }

    /// Parses an `/set` result.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a set result.
    pub fn set_response(&self) -> Result<SetResponse> {
        if let Some(error) = self.error() {
            let message = format!("{} call failed: {error}", self.call_id);
            return Err(Error::protocol(message));
        }
        serde_json::from_value(self.result.clone()).map_err(Into::into)
    }
}

impl Serialize for MethodResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.name, &self.result, &self.call_id).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MethodResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (name, result, call_id) = <(String, Value, String)>::deserialize(deserializer)?;
        Ok(Self {
            name,
            result,
            call_id,
        })
    }
}

/// The response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Responses in reply order.
    pub method_responses: Vec<MethodResponse>,
    /// Server session state, if reported.
    #[serde(default)]
    pub session_state: Option<String>,
}

/// Returns the first response with the given method name.
///
/// # Errors
///
/// Returns a protocol error if no response carries that name. If the server
/// sent a method-level error instead, its text is included.
pub fn find_response<'a>(
    responses: &'a [MethodResponse],
    name: &str,
) -> Result<&'a MethodResponse> {
    responses
        .iter()
        .find(|response| response.name == name)
        .ok_or_else(|| {
            responses.iter().find_map(MethodResponse::error).map_or_else(
                || Error::protocol(format!("missing {name} in response")),
                |error| Error::protocol(format!("{name} failed: {error}")),
            )
        })
}

/// Parses every `Email/set` response in reply order.
///
/// # Errors
///
/// Returns an error if an `Email/set` payload is malformed.
pub fn set_responses(responses: &[MethodResponse]) -> Result<Vec<SetResponse>> {
    responses
        .iter()
        .filter(|response| response.name == crate::methods::EMAIL_SET)
        .map(MethodResponse::set_response)
        .collect()
}

/// Returns all responses answering the given call-id.
pub fn responses_for<'a>(
    responses: &'a [MethodResponse],
    call_id: &'a str,
) -> impl Iterator<Item = &'a MethodResponse> {
    responses
        .iter()
        .filter(move |response| response.call_id == call_id)
}

/// Method-level error payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MethodError {
    /// Error type (e.g. `invalidArguments`).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl std::fmt::Display for MethodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.error_type),
            None => f.write_str(&self.error_type),
        }
    }
}

/// Per-item rejection inside a `/set` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetError {
    /// Error type (e.g. `notFound`).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Parsed `/set` result.
///
/// The server reports per-item outcomes; nothing here is all-or-nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResponse {
    /// Account the changes applied to.
    #[serde(default)]
    pub account_id: Option<String>,
    /// State before the call.
    #[serde(default)]
    pub old_state: Option<String>,
    /// State after the call.
    #[serde(default)]
    pub new_state: Option<String>,
    /// Created records by creation id.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created: HashMap<String, Value>,
    /// Updated ids, each with any server-set properties.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updated: HashMap<String, Option<Value>>,
    /// Destroyed ids.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub destroyed: Vec<String>,
    /// Rejected creations.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_created: HashMap<String, SetError>,
    /// Rejected updates.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_updated: HashMap<String, SetError>,
    /// Rejected destructions.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub not_destroyed: HashMap<String, SetError>,
}

impl SetResponse {
    /// Returns true if the server rejected nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.not_created.is_empty() && self.not_updated.is_empty() && self.not_destroyed.is_empty()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
