use std::collections::BTreeSet;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::parse::{Method, Resource, Schema, Service};

use super::{
    IntoCode,
    emit::SourceBuilder,
    naming::{self, Shape},
    sorted,
    statics::{CLI_IMPORTS, LICENSE},
};

/// Prefix for flags backed by method parameters.
const PARAMETER_PREFIX: &str = "";
/// Prefix for flags backed by request-body properties, keeping them
/// from colliding with a parameter of the same name.
const REQUEST_OBJECT_PREFIX: &str = "request_";

/// Generates the Swift command-line tool source unit for a service.
///
/// Every method becomes one subcommand named `<resource-path>.<method>`,
/// plus a top-level `login` subcommand for browser-based sign-in.
pub struct CliUnit<'a> {
    service: &'a Service,
}

impl<'a> CliUnit<'a> {
    pub fn new(service: &'a Service) -> Self {
        Self { service }
    }

    /// Renders the complete program.
    pub fn render(&self) -> String {
        let mut s = SourceBuilder::new();
        s.push_raw(LICENSE);
        s.blank();
        for import in CLI_IMPORTS {
            s.line(0, format!("import {import}"));
        }
        s.blank();
        s.line(
            0,
            format!("let CLIENT_CREDENTIALS = \"{}.json\"", self.service.name),
        );
        s.line(0, format!("let TOKEN = \"{}.json\"", self.service.name));
        s.blank();
        s.line(0, "func main() throws {");
        self.scope_list(&mut s);
        s.blank();
        s.line(
            2,
            "guard let tokenProvider = BrowserTokenProvider(credentials:CLIENT_CREDENTIALS, token:TOKEN) else {",
        );
        s.line(4, "return");
        s.line(2, "}");
        s.line(
            2,
            format!(
                "let {} = try {}(tokenProvider:tokenProvider)",
                self.service.name,
                naming::class_name(&self.service.name)
            ),
        );
        s.blank();
        s.line(2, "let group = Group {");
        s.line(
            4,
            "$0.command(\"login\", description:\"Log in with browser-based authentication.\") {",
        );
        s.line(6, "try tokenProvider.signIn(scopes:scopes)");
        s.line(6, "try tokenProvider.saveToken(TOKEN)");
        s.line(4, "}");
        for (name, resource) in sorted(&self.service.resources) {
            self.resource_commands(&mut s, name, resource);
        }
        s.line(2, "}");
        s.line(2, "group.run()");
        s.line(0, "}");
        s.blank();
        s.line(0, "do {");
        s.line(2, "try main()");
        s.line(0, "} catch (let error) {");
        s.line(2, r#"print("Application error: \(error)")"#);
        s.line(0, "}");
        s.finish()
    }

    /// Emits the login scope list: the union of every method's scopes
    /// across the whole resource tree, sorted and deduplicated.
    fn scope_list(&self, s: &mut SourceBuilder) {
        let mut scopes = BTreeSet::new();
        collect_scopes(&self.service.resources, &mut scopes);
        let scopes: Vec<&str> = scopes.into_iter().collect();
        if scopes.len() == 1 {
            s.line(2, format!("let scopes = [\"{}\"]", scopes[0]));
        } else {
            s.line(2, "let scopes = [");
            s.push_raw(&format!(
                "    \"{}\"]\n",
                scopes.iter().join("\",\n    \"")
            ));
        }
    }

    /// Emits one subcommand per method, recursing into nested resources
    /// with the accumulated qualified name.
    fn resource_commands(&self, s: &mut SourceBuilder, name: &str, resource: &Resource) {
        for (method_name, method) in sorted(&resource.methods) {
            let request_schema = method
                .request_type_name()
                .and_then(|type_name| self.service.schema(type_name));
            self.method_command(s, name, method_name, method, request_schema);
        }
        for (child_name, child) in sorted(&resource.resources) {
            self.resource_commands(s, &format!("{name}_{child_name}"), child);
        }
    }

    fn method_command(
        &self,
        s: &mut SourceBuilder,
        resource: &str,
        method_name: &str,
        method: &Method,
        request_schema: Option<&Schema>,
    ) {
        s.push_raw("\n");
        s.line(4, "$0.command(");
        s.line(6, format!("\"{resource}.{method_name}\","));
        for (key, parameter) in sorted(&method.parameters) {
            if let Some(declaration) = option_declaration(PARAMETER_PREFIX, key, parameter) {
                s.line(6, declaration);
            }
        }
        if let Some(request_schema) = request_schema {
            for (key, property) in sorted(&request_schema.properties) {
                if let Some(declaration) = option_declaration(REQUEST_OBJECT_PREFIX, key, property)
                {
                    s.line(6, declaration);
                }
            }
        }
        let description = method
            .description
            .as_deref()
            .map(naming::one_line)
            .unwrap_or_default();
        s.line(6, format!("description: \"{description}\") {{"));
        let parameter_args = parameter_arguments(method);
        let request_args = request_arguments(request_schema);
        match (parameter_args.is_empty(), request_args.is_empty()) {
            (false, false) => s.line(6, format!("{parameter_args}, {request_args} in")),
            (false, true) => s.line(6, format!("{parameter_args} in")),
            (true, false) => s.line(6, format!("{request_args} in")),
            (true, true) => {}
        }
        s.line(6, "do {");
        if method.has_parameters() {
            self.parameter_bindings(s, resource, method_name, method);
        }
        if method.has_request() {
            self.request_bindings(s, method, request_schema);
        }
        s.line(8, "let sem = DispatchSemaphore(value: 0)");
        s.line(8, self.invocation(resource, method_name, method));
        let mut arguments = String::new();
        if method.has_response() {
            arguments.push_str("response, ");
        }
        arguments.push_str("error in");
        s.line(10, arguments);
        if method.has_response() {
            s.line(10, "if let response = response {");
            s.line(
                12,
                "print(\"RESPONSE: \" + String(describing: type(of: response)))",
            );
            s.line(12, "if let jsonData = try? JSONEncoder().encode(response),");
            s.line(14, "let jsonString = String(data: jsonData, encoding: .utf8) {");
            s.line(14, "print (jsonString)");
            s.line(12, "} else {");
            s.line(14, r#"print("\(String(describing:response))")"#);
            s.line(12, "}");
            s.line(10, "}");
        }
        s.line(10, r#"if let error = error { print ("ERROR: \(error)") }"#);
        s.line(10, "sem.signal()");
        s.line(8, "}");
        s.line(8, "_ = sem.wait()");
        s.line(6, "} catch let error {");
        s.line(8, r#"print ("Client error: \(error)")"#);
        s.line(6, "}");
        s.line(4, "}");
    }

    /// Copies the first value of each scalar parameter flag into the
    /// parameter bag.
    fn parameter_bindings(
        &self,
        s: &mut SourceBuilder,
        resource: &str,
        method_name: &str,
        method: &Method,
    ) {
        s.line(
            8,
            format!(
                "var parameters = {}.{}()",
                naming::class_name(&self.service.name),
                naming::parameters_type_name(resource, method_name)
            ),
        );
        for (key, parameter) in sorted(&method.parameters) {
            if is_scalar(parameter) {
                let flag = format!("{PARAMETER_PREFIX}{key}");
                s.line(8, format!("if let {flag} = {flag}.first {{"));
                s.line(10, format!("parameters.{key} = {flag}"));
                s.line(8, "}");
            }
        }
    }

    /// Copies flag values into the request record: the first value of
    /// each scalar flag, and every value of an `array<string>` flag.
    fn request_bindings(
        &self,
        s: &mut SourceBuilder,
        method: &Method,
        request_schema: Option<&Schema>,
    ) {
        let Some(type_name) = method.request_type_name() else {
            return;
        };
        s.line(
            8,
            format!(
                "var request = {}.{type_name}()",
                naming::class_name(&self.service.name)
            ),
        );
        let Some(request_schema) = request_schema else {
            return;
        };
        for (key, property) in sorted(&request_schema.properties) {
            let flag = format!("{REQUEST_OBJECT_PREFIX}{key}");
            match naming::shape(property) {
                Shape::String | Shape::Integer => {
                    s.line(8, format!("if let {flag} = {flag}.first {{"));
                    s.line(10, format!("request.{key} = {flag}"));
                    s.line(8, "}");
                }
                Shape::Array(items) if matches!(naming::shape(items), Shape::String) => {
                    s.line(8, format!("if {flag}.count > 0 {{"));
                    s.line(10, format!("request.{key} = {flag}"));
                    s.line(8, "}");
                }
                // `array<any>` flags are parsed but never assigned to
                // the request.
                _ => {}
            }
        }
    }

    /// Builds the invocation line for the generated library call.
    fn invocation(&self, resource: &str, method_name: &str, method: &Method) -> String {
        let mut invocation = format!("try {}.{resource}_{method_name}(", self.service.name);
        if method.has_request() {
            if method.has_parameters() {
                invocation.push_str("request: request, parameters:parameters");
            } else {
                invocation.push_str("request:request");
            }
        } else if method.has_parameters() {
            invocation.push_str("parameters:parameters");
        }
        invocation.push_str(") {");
        invocation
    }
}

impl IntoCode for CliUnit<'_> {
    type Code = (String, String);

    fn into_code(self) -> Self::Code {
        ("main.swift".to_owned(), self.render())
    }
}

fn collect_scopes<'a>(resources: &'a IndexMap<String, Resource>, scopes: &mut BTreeSet<&'a str>) {
    for resource in resources.values() {
        for method in resource.methods.values() {
            scopes.extend(method.scopes.iter().map(String::as_str));
        }
        collect_scopes(&resource.resources, scopes);
    }
}

/// Builds the Commander option declaration for one flag, or skips the
/// flag with a diagnostic when the schema has no flag mapping.
fn option_declaration(prefix: &str, name: &str, schema: &Schema) -> Option<String> {
    let description = schema
        .description
        .as_deref()
        .map(naming::one_line)
        .unwrap_or_default();
    match naming::shape(schema) {
        // Commander can't express a scalar option that may be absent; a
        // single-element option list stands in (kylef/Commander#49).
        Shape::String => Some(format!(
            "Options<String>(\"{prefix}{name}\", default: [], count: 1, description: \"{description}\"),"
        )),
        Shape::Integer => Some(format!(
            "Options<Int>(\"{prefix}{name}\", default: [], count: 1, description: \"{description}\"),"
        )),
        Shape::Array(items) if matches!(naming::shape(items), Shape::String) => Some(format!(
            "VariadicOption<String>(\"{prefix}{name}\", default: [], description: \"{description}\"),"
        )),
        Shape::Array(items) if matches!(naming::shape(items), Shape::Any) => Some(format!(
            "VariadicOption<JSONAny>(\"{prefix}{name}\", default: [], description: \"{description}\"),"
        )),
        _ => {
            let json =
                serde_json::to_string(schema).unwrap_or_else(|_| "<unencodable>".to_owned());
            log::warn!("Unsupported schema for option {prefix}{name}: {json}");
            None
        }
    }
}

fn is_scalar(schema: &Schema) -> bool {
    matches!(naming::shape(schema), Shape::String | Shape::Integer)
}

fn has_flag_binding(schema: &Schema) -> bool {
    match naming::shape(schema) {
        Shape::String | Shape::Integer => true,
        Shape::Array(items) => matches!(naming::shape(items), Shape::String | Shape::Any),
        _ => false,
    }
}

/// Closure arguments for scalar parameter flags.
fn parameter_arguments(method: &Method) -> String {
    sorted(&method.parameters)
        .filter(|(_, parameter)| is_scalar(parameter))
        .map(|(key, _)| format!("{PARAMETER_PREFIX}{key}"))
        .join(", ")
}

/// Closure arguments for request-property flags with a flag mapping.
fn request_arguments(request_schema: Option<&Schema>) -> String {
    let Some(schema) = request_schema else {
        return String::new();
    };
    sorted(&schema.properties)
        .filter(|(_, property)| has_flag_binding(property))
        .map(|(key, _)| format!("{REQUEST_OBJECT_PREFIX}{key}"))
        .join(", ")
}
