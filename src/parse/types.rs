use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SerdeError;

/// A Google API discovery document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub base_url: String,
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default)]
    pub resources: IndexMap<String, Resource>,
}

impl Service {
    /// Parses a discovery document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SerdeError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let result = serde_path_to_error::deserialize(&mut deserializer)?;
        Ok(result)
    }

    /// Looks up a top-level schema by its declared name, case-sensitively.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }
}

/// A named grouping of methods and nested resources under a service.
#[derive(Debug, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub methods: IndexMap<String, Method>,
    #[serde(default)]
    pub resources: IndexMap<String, Resource>,
}

/// A single API method.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    #[serde(default)]
    pub description: Option<String>,
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub parameters: IndexMap<String, Schema>,
    #[serde(default)]
    pub request: Option<SchemaRef>,
    #[serde(default)]
    pub response: Option<SchemaRef>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Method {
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// The declared request type, which is always the `$ref` target.
    pub fn request_type_name(&self) -> Option<&str> {
        self.request.as_ref().map(|request| request.reference.as_str())
    }

    /// The declared response type, which is always the `$ref` target.
    pub fn response_type_name(&self) -> Option<&str> {
        self.response.as_ref().map(|response| response.reference.as_str())
    }
}

/// A reference to a named schema elsewhere in the same document.
#[derive(Debug, Deserialize, Serialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// A data shape: object, array, primitive, or `any`.
///
/// Also describes method parameters, in which case [`Schema::location`]
/// records where the parameter is carried.
#[derive(Debug, Deserialize, Serialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

/// Where a method parameter is carried in the request.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}
