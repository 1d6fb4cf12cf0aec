//! Domain constants shared across the composition engine.

/// File extension of ReqM documents (without the leading dot).
pub const DOCUMENT_EXT: &str = "reqm";

/// Name of the per-folder index cache file.
pub const INDEX_FILE: &str = "index";

/// Field delimiter used by the index cache file.
pub const INDEX_DELIMITER: char = ';';

/// Standard library directory, relative to the application home.
pub const STDLIB_DIR: &str = "stdlib";

/// User cache directory, relative to the user home.
pub const USER_CACHE_DIR: &str = ".reqm/cache";

/// Domain assigned to a lead application that declares none.
pub const DEFAULT_DOMAIN: &str = "default";

/// Application type assigned to a lead application without a `from` clause.
pub const DEFAULT_APPLICATION_TYPE: &str = "reqm.Application";

/// Type assigned to typeless properties by the completeness check.
pub const DEFAULT_PROPERTY_TYPE: &str = "String";

/// Property holding `event = action` bindings.
pub const EVENTS_PROPERTY: &str = "events";

/// Property holding the nested view tree of a view.
pub const LAYOUT_PROPERTY: &str = "layout";

/// Built-in standard types. References to these never leave the document.
pub const STANDARD_TYPES: &[&str] = &[
    "String", "Text", "Boolean", "Integer", "Long", "Short", "Byte", "Float", "Double",
    "Decimal", "Date", "Time", "DateTime", "Timestamp", "Binary", "Blob", "Url", "Email",
    "Uuid", "Any",
];

/// Returns true if `name` (optionally domain-qualified) is a built-in standard type.
pub fn is_standard_type(name: &str) -> bool {
    let simple = name.rsplit('.').next().unwrap_or(name);
    STANDARD_TYPES.contains(&simple)
}
