use heck::ToPascalCase;
use itertools::Itertools;

use crate::parse::Schema;

/// The closed set of schema shapes the generators know how to map.
#[derive(Clone, Copy, Debug)]
pub enum Shape<'a> {
    Object,
    Array(&'a Schema),
    /// An `array` schema that declares no item schema.
    ArrayWithoutItems,
    Any,
    String,
    Integer,
    Number,
    Boolean,
    Ref(&'a str),
    /// No `type` tag and no `$ref`; nothing to go on.
    Untyped,
    /// A `type` tag outside the recognized set, kept for diagnostics.
    Unsupported(&'a str),
}

/// Classifies a schema into its tagged shape.
pub fn shape(schema: &Schema) -> Shape<'_> {
    if let Some(reference) = schema.reference.as_deref() {
        return Shape::Ref(reference);
    }
    match schema.kind.as_deref() {
        Some("object") => Shape::Object,
        Some("array") => match &schema.items {
            Some(items) => Shape::Array(items),
            None => Shape::ArrayWithoutItems,
        },
        Some("any") => Shape::Any,
        Some("string") => Shape::String,
        Some("integer") => Shape::Integer,
        Some("number") => Shape::Number,
        Some("boolean") => Shape::Boolean,
        Some(other) => Shape::Unsupported(other),
        None => Shape::Untyped,
    }
}

/// Maps a property or parameter schema to a Swift type expression.
///
/// Object-typed and otherwise unmapped shapes fall back to the `Object`
/// catch-all class that every generated library declares.
pub fn swift_type(schema: &Schema) -> String {
    match shape(schema) {
        Shape::Ref(name) => name.to_owned(),
        Shape::String => "String".to_owned(),
        Shape::Integer => "Int".to_owned(),
        Shape::Number => "Double".to_owned(),
        Shape::Boolean => "Bool".to_owned(),
        Shape::Any => "JSONAny".to_owned(),
        Shape::Array(items) => format!("[{}]", swift_type(items)),
        Shape::ArrayWithoutItems => "[Object]".to_owned(),
        Shape::Object | Shape::Untyped | Shape::Unsupported(_) => "Object".to_owned(),
    }
}

/// Converts a document identifier into a Swift field or function name.
///
/// Only the first character is lowercased; underscores are preserved so
/// that qualified method names like `files_versions_get` survive
/// conversion unchanged.
pub fn field_name(name: &str) -> String {
    let cleaned = clean(name);
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => cleaned,
    }
}

/// The Swift class name for a service (`drive` → `Drive`).
pub fn class_name(name: &str) -> String {
    clean(name).to_pascal_case()
}

/// The derived name of a method's parameter-bag type.
///
/// Each underscore-separated segment of the qualified resource path and
/// the method name is capitalized, so `files_versions` + `get` becomes
/// `Files_Versions_GetParameters`.
pub fn parameters_type_name(resource: &str, method: &str) -> String {
    let qualified = format!("{resource}_{method}");
    let mut name: String = qualified.split('_').map(capitalize).join("_");
    name.push_str("Parameters");
    name
}

/// Flattens a description onto one line for embedding in emitted text.
pub fn one_line(text: &str) -> String {
    text.replace('\n', " ")
}

/// Makes a string usable inside a Swift identifier.
pub fn clean(s: &str) -> String {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut string = String::with_capacity(s.len());
    if first == '_' || unicode_ident::is_xid_start(first) {
        string.push(first);
    } else {
        string.push('_');
        chars = s.chars();
    }
    string.push_str(
        &chars
            .as_str()
            .replace(|next: char| !unicode_ident::is_xid_continue(next), "_"),
    );
    string
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).expect("fixture should deserialize")
    }

    #[test]
    fn test_field_name_lowercases_first_character() {
        assert_eq!(field_name("Type"), "type");
        assert_eq!(field_name("maxResults"), "maxResults");
    }

    #[test]
    fn test_field_name_preserves_underscores() {
        assert_eq!(field_name("files_versions_get"), "files_versions_get");
    }

    #[test]
    fn test_field_name_cleans_separators() {
        assert_eq!(field_name("foo-bar"), "foo_bar");
        assert_eq!(field_name("user.profile"), "user_profile");
    }

    #[test]
    fn test_field_name_is_idempotent() {
        for name in ["Type", "files_versions_get", "foo-bar", "maxResults"] {
            assert_eq!(field_name(&field_name(name)), field_name(name));
        }
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("drive"), "Drive");
        assert_eq!(class_name("admin_directory"), "AdminDirectory");
    }

    #[test]
    fn test_parameters_type_name() {
        assert_eq!(parameters_type_name("items", "get"), "Items_GetParameters");
        assert_eq!(
            parameters_type_name("files_versions", "get"),
            "Files_Versions_GetParameters"
        );
    }

    #[test]
    fn test_swift_type_scalars() {
        assert_eq!(swift_type(&schema(json!({"type": "string"}))), "String");
        assert_eq!(swift_type(&schema(json!({"type": "integer"}))), "Int");
        assert_eq!(swift_type(&schema(json!({"type": "number"}))), "Double");
        assert_eq!(swift_type(&schema(json!({"type": "boolean"}))), "Bool");
        assert_eq!(swift_type(&schema(json!({"type": "any"}))), "JSONAny");
    }

    #[test]
    fn test_swift_type_reference() {
        assert_eq!(swift_type(&schema(json!({"$ref": "Item"}))), "Item");
    }

    #[test]
    fn test_swift_type_arrays() {
        assert_eq!(
            swift_type(&schema(json!({"type": "array", "items": {"type": "string"}}))),
            "[String]"
        );
        assert_eq!(
            swift_type(&schema(json!({"type": "array", "items": {"$ref": "Item"}}))),
            "[Item]"
        );
    }

    #[test]
    fn test_swift_type_falls_back_to_object() {
        assert_eq!(swift_type(&schema(json!({"type": "object"}))), "Object");
        assert_eq!(swift_type(&schema(json!({"type": "weird"}))), "Object");
        assert_eq!(swift_type(&schema(json!({}))), "Object");
    }

    #[test]
    fn test_shape_carries_unsupported_tag() {
        let schema = schema(json!({"type": "weird"}));
        assert!(matches!(shape(&schema), Shape::Unsupported("weird")));
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("The file\nto fetch."), "The file to fetch.");
    }
}
