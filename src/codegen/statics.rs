use indoc::indoc;

/// License header prepended to every generated source unit.
pub const LICENSE: &str = indoc! {r#"
    // Copyright 2025 Discogen Authors. All Rights Reserved.
    //
    // Licensed under the Apache License, Version 2.0 (the "License");
    // you may not use this file except in compliance with the License.
    // You may obtain a copy of the License at
    //
    //    http://www.apache.org/licenses/LICENSE-2.0
    //
    // Unless required by applicable law or agreed to in writing, software
    // distributed under the License is distributed on an "AS IS" BASIS,
    // WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    // See the License for the specific language governing permissions and
    // limitations under the License.
"#};

/// Modules imported by every generated client library.
pub const LIBRARY_IMPORTS: &[&str] = &["Foundation", "OAuth2", "GoogleAPIRuntime"];

/// Modules imported by every generated command-line tool.
pub const CLI_IMPORTS: &[&str] = &[
    "Foundation",
    "Dispatch",
    "OAuth2",
    "GoogleAPIRuntime",
    "Commander",
];
