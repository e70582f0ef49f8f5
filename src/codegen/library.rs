use itertools::Itertools;

use crate::parse::{Method, ParameterLocation, Resource, Schema, Service};

use super::{
    IntoCode,
    emit::SourceBuilder,
    naming::{self, Shape},
    sorted,
    statics::{LIBRARY_IMPORTS, LICENSE},
};

/// Generates the Swift client library source unit for a service.
///
/// The unit declares one record per object schema, one parameter bag
/// per method with parameters, and one call wrapper per method, all
/// inside a single service class that delegates to the shared runtime.
pub struct LibraryUnit<'a> {
    service: &'a Service,
}

impl<'a> LibraryUnit<'a> {
    pub fn new(service: &'a Service) -> Self {
        Self { service }
    }

    /// Renders the complete source unit.
    pub fn render(&self) -> String {
        let mut s = SourceBuilder::new();
        s.push_raw(LICENSE);
        s.blank();
        for import in LIBRARY_IMPORTS {
            s.line(0, format!("import {import}"));
        }
        s.blank();
        s.line(
            0,
            format!(
                "public class {} : Service {{",
                naming::class_name(&self.service.name)
            ),
        );
        s.blank();
        s.line(2, "init(tokenProvider: TokenProvider) throws {");
        s.line(
            4,
            format!(
                "try super.init(tokenProvider, \"{}\")",
                self.service.base_url
            ),
        );
        s.line(2, "}");
        s.blank();
        s.line(2, "public class Object : Codable {}");
        for (name, schema) in sorted(&self.service.schemas) {
            schema_declaration(&mut s, name, schema);
        }
        for (name, resource) in sorted(&self.service.resources) {
            resource_callers(&mut s, name, resource);
        }
        s.line(0, "}");
        s.finish()
    }
}

impl IntoCode for LibraryUnit<'_> {
    type Code = (String, String);

    fn into_code(self) -> Self::Code {
        let path = format!("{}.swift", naming::class_name(&self.service.name));
        (path, self.render())
    }
}

/// Emits the declaration for one top-level schema, branching on its
/// shape. Unhandled shapes become inline markers so the rest of the
/// unit still generates.
fn schema_declaration(s: &mut SourceBuilder, name: &str, schema: &Schema) {
    match naming::shape(schema) {
        Shape::Object => {
            s.blank();
            s.line(2, format!("public struct {name} : Codable {{"));
            for (key, property) in sorted(&schema.properties) {
                s.line(
                    4,
                    format!(
                        "public var `{}` : {}?",
                        naming::field_name(key),
                        naming::swift_type(property)
                    ),
                );
            }
            s.line(2, "}");
        }
        Shape::Array(items) => {
            s.blank();
            array_declaration(s, name, items);
        }
        Shape::ArrayWithoutItems => {
            // No item schema means no element type to alias.
            s.blank();
        }
        Shape::Any => {
            s.blank();
            s.line(2, format!("typealias {name} = JSONAny"));
        }
        Shape::String | Shape::Integer | Shape::Number | Shape::Boolean => {
            s.blank();
            s.line(
                2,
                format!("public typealias {name} = {}", naming::swift_type(schema)),
            );
        }
        Shape::Ref(_) | Shape::Untyped | Shape::Unsupported(_) => {
            log::warn!("Unhandled schema {name} with type {:?}", schema.kind.as_deref());
            s.line(
                0,
                format!(
                    "ERROR-UNHANDLED-SCHEMA-VALUE-TYPE {name} {:?}",
                    schema.kind.as_deref()
                ),
            );
        }
    }
}

/// Emits the sequence alias for an array schema, plus the synthesized
/// item record when the items are objects.
fn array_declaration(s: &mut SourceBuilder, name: &str, items: &Schema) {
    match naming::shape(items) {
        Shape::Object => {
            s.line(
                2,
                format!(
                    "public typealias {} = [{name}Item]",
                    naming::field_name(name)
                ),
            );
            s.blank();
            s.line(2, format!("public struct {name}Item : Codable {{"));
            for (key, property) in sorted(&items.properties) {
                s.line(
                    4,
                    format!("public var `{key}` : {}?", naming::swift_type(property)),
                );
            }
            s.line(0, "}");
        }
        Shape::Untyped => {}
        Shape::Unsupported(tag) => {
            log::warn!("Unhandled array item type {tag} in schema {name}");
            s.line(0, format!("ERROR-UNHANDLED-ARRAY-TYPE {tag}"));
        }
        _ => {
            s.line(
                2,
                format!(
                    "public typealias {} = [{}]",
                    naming::field_name(name),
                    naming::swift_type(items)
                ),
            );
        }
    }
}

/// Emits call wrappers for every method in a resource, recursing into
/// nested resources with the accumulated qualified name.
fn resource_callers(s: &mut SourceBuilder, name: &str, resource: &Resource) {
    for (method_name, method) in sorted(&resource.methods) {
        if method.has_parameters() {
            parameters_type_declaration(s, name, method_name, method);
        }
        method_caller(s, name, method_name, method);
    }
    for (child_name, child) in sorted(&resource.resources) {
        resource_callers(s, &format!("{name}_{child_name}"), child);
    }
}

/// Emits the parameter-bag record for a method, with accessors naming
/// the query and path subsets.
fn parameters_type_declaration(
    s: &mut SourceBuilder,
    resource: &str,
    method_name: &str,
    method: &Method,
) {
    s.blank();
    s.line(
        2,
        format!(
            "public struct {} : Parameterizable {{",
            naming::parameters_type_name(resource, method_name)
        ),
    );
    for (key, parameter) in sorted(&method.parameters) {
        s.line(
            4,
            format!(
                "public var {} : {}?",
                naming::field_name(key),
                naming::swift_type(parameter)
            ),
        );
    }
    location_accessor(s, "queryParameters", method, ParameterLocation::Query);
    location_accessor(s, "pathParameters", method, ParameterLocation::Path);
    s.line(2, "}");
}

fn location_accessor(
    s: &mut SourceBuilder,
    name: &str,
    method: &Method,
    location: ParameterLocation,
) {
    let names = sorted(&method.parameters)
        .filter(|(_, parameter)| parameter.location == Some(location))
        .map(|(key, _)| format!("\"{key}\""))
        .join(",");
    s.line(4, format!("public func {name}() -> [String] {{"));
    s.line(6, format!("return [{names}]"));
    s.line(4, "}");
}

/// Emits the call wrapper that forwards one method to the runtime
/// `perform` primitive.
fn method_caller(s: &mut SourceBuilder, resource: &str, method_name: &str, method: &Method) {
    let qualified = format!("{resource}_{method_name}");
    s.blank();
    s.line(2, format!("public func {} (", naming::field_name(&qualified)));
    if let Some(request) = method.request_type_name() {
        s.line(4, format!("request: {request},"));
    }
    if method.has_parameters() {
        s.line(
            4,
            format!(
                "parameters: {},",
                naming::parameters_type_name(resource, method_name)
            ),
        );
    }
    match method.response_type_name() {
        Some(response) => s.line(
            4,
            format!("completion: @escaping ({response}?, Error?) -> ()) throws {{"),
        ),
        None => s.line(4, "completion: @escaping (Error?) -> ()) throws {"),
    }
    s.line(6, "try perform(");
    s.line(8, format!("method: \"{}\",", method.http_method));
    s.line(8, format!("path: \"{}\",", method.path));
    if method.has_request() {
        s.line(8, "request: request,");
    }
    if method.has_parameters() {
        s.line(8, "parameters: parameters,");
    }
    s.line(8, "completion: completion)");
    s.line(2, "}");
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn service(value: serde_json::Value) -> Service {
        serde_json::from_value(value).expect("fixture should deserialize")
    }

    fn demo_service() -> Service {
        service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {
                "Item": {
                    "type": "object",
                    "properties": {"id": {"type": "string"}}
                }
            },
            "resources": {
                "items": {
                    "methods": {
                        "get": {
                            "httpMethod": "GET",
                            "path": "/items/{id}",
                            "parameters": {
                                "id": {"type": "string", "location": "path"}
                            },
                            "response": {"$ref": "Item"}
                        }
                    }
                }
            }
        }))
    }

    #[test]
    fn test_demo_service_library() {
        let rendered = LibraryUnit::new(&demo_service()).render();
        let expected = format!(
            "{}{}",
            LICENSE,
            indoc! {r#"

                import Foundation
                import OAuth2
                import GoogleAPIRuntime

                public class Demo : Service {

                  init(tokenProvider: TokenProvider) throws {
                    try super.init(tokenProvider, "https://x")
                  }

                  public class Object : Codable {}

                  public struct Item : Codable {
                    public var `id` : String?
                  }

                  public struct Items_GetParameters : Parameterizable {
                    public var id : String?
                    public func queryParameters() -> [String] {
                      return []
                    }
                    public func pathParameters() -> [String] {
                      return ["id"]
                    }
                  }

                  public func items_get (
                    parameters: Items_GetParameters,
                    completion: @escaping (Item?, Error?) -> ()) throws {
                      try perform(
                        method: "GET",
                        path: "/items/{id}",
                        parameters: parameters,
                        completion: completion)
                  }
                }
            "#}
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = LibraryUnit::new(&demo_service()).render();
        let second = LibraryUnit::new(&demo_service()).render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_supported_shapes_have_no_markers() {
        let service = service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {
                "Anys": {"type": "array", "items": {"type": "any"}},
                "Blob": {"type": "any"},
                "Count": {"type": "integer"},
                "Item": {"type": "object", "properties": {"id": {"type": "string"}}},
                "Items": {"type": "array", "items": {"type": "object", "properties": {"id": {"type": "string"}}}},
                "Name": {"type": "string"},
                "Tags": {"type": "array", "items": {"type": "string"}}
            }
        }));
        let rendered = LibraryUnit::new(&service).render();
        assert!(!rendered.contains("ERROR-UNHANDLED"));
        assert!(rendered.contains("public typealias anys = [JSONAny]"));
        assert!(rendered.contains("typealias Blob = JSONAny"));
        assert!(rendered.contains("public typealias Count = Int"));
        assert!(rendered.contains("public typealias items = [ItemsItem]"));
        assert!(rendered.contains("public struct ItemsItem : Codable {"));
        assert!(rendered.contains("public typealias Name = String"));
        assert!(rendered.contains("public typealias tags = [String]"));
    }

    #[test]
    fn test_unsupported_schema_is_isolated() {
        let service = service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {
                "Bad": {"type": "unknown"},
                "Good": {"type": "object", "properties": {"id": {"type": "string"}}}
            }
        }));
        let rendered = LibraryUnit::new(&service).render();
        assert_eq!(rendered.matches("ERROR-UNHANDLED").count(), 1);
        assert!(
            rendered.contains("ERROR-UNHANDLED-SCHEMA-VALUE-TYPE Bad Some(\"unknown\")")
        );
        assert!(rendered.contains("public struct Good : Codable {"));
    }

    #[test]
    fn test_unsupported_array_item_marker() {
        let service = service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {
                "Odd": {"type": "array", "items": {"type": "mystery"}}
            }
        }));
        let rendered = LibraryUnit::new(&service).render();
        assert!(rendered.contains("ERROR-UNHANDLED-ARRAY-TYPE mystery"));
    }

    #[test]
    fn test_query_and_path_partition() {
        let service = service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {"Item": {"type": "object"}},
            "resources": {
                "items": {
                    "methods": {
                        "list": {
                            "httpMethod": "GET",
                            "path": "/items/{a}/{c}",
                            "parameters": {
                                "c": {"type": "string", "location": "path"},
                                "a": {"type": "string", "location": "path"},
                                "b": {"type": "string", "location": "query"}
                            }
                        }
                    }
                }
            }
        }));
        let rendered = LibraryUnit::new(&service).render();
        let query = rendered
            .find("queryParameters")
            .expect("query accessor should be emitted");
        let path = rendered
            .find("pathParameters")
            .expect("path accessor should be emitted");
        assert!(rendered[query..path].contains("return [\"b\"]"));
        assert!(rendered[path..].contains("return [\"a\",\"c\"]"));
    }

    #[test]
    fn test_nested_resources_use_qualified_names() {
        let service = service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {"Item": {"type": "object"}},
            "resources": {
                "files": {
                    "resources": {
                        "versions": {
                            "methods": {
                                "get": {
                                    "httpMethod": "GET",
                                    "path": "/files/{fileId}/versions/{id}",
                                    "parameters": {
                                        "id": {"type": "string", "location": "path"}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }));
        let rendered = LibraryUnit::new(&service).render();
        assert!(rendered.contains("public func files_versions_get ("));
        assert!(
            rendered
                .contains("public struct Files_Versions_GetParameters : Parameterizable {")
        );
    }

    #[test]
    fn test_request_and_parameters_forwarded_to_perform() {
        let service = service(json!({
            "name": "demo",
            "baseUrl": "https://x",
            "schemas": {
                "Item": {"type": "object", "properties": {"name": {"type": "string"}}}
            },
            "resources": {
                "items": {
                    "methods": {
                        "insert": {
                            "httpMethod": "POST",
                            "path": "/items",
                            "parameters": {
                                "pretty": {"type": "string", "location": "query"}
                            },
                            "request": {"$ref": "Item"},
                            "response": {"$ref": "Item"}
                        }
                    }
                }
            }
        }));
        let rendered = LibraryUnit::new(&service).render();
        let wrapper = concat!(
            "  public func items_insert (\n",
            "    request: Item,\n",
            "    parameters: Items_InsertParameters,\n",
            "    completion: @escaping (Item?, Error?) -> ()) throws {\n",
            "      try perform(\n",
            "        method: \"POST\",\n",
            "        path: \"/items\",\n",
            "        request: request,\n",
            "        parameters: parameters,\n",
            "        completion: completion)\n",
            "  }\n",
        );
        assert!(rendered.contains(wrapper), "missing wrapper in:\n{rendered}");
    }
}
