//! Decoding TOML values into engine attributes.

use cloud_patrol_core::Attribute;

/// Decodes a TOML value.
///
/// A string wrapped in `${` and `}` is a deferred token and becomes
/// [`Attribute::Unresolved`]. Datetimes are kept as their TOML text.
#[must_use]
pub fn decode(value: toml::Value) -> Attribute {
    match value {
        toml::Value::String(s) if is_token(&s) => Attribute::Unresolved(s),
        toml::Value::String(s) => Attribute::String(s),
        toml::Value::Integer(i) => Attribute::Integer(i),
        toml::Value::Float(x) => Attribute::Float(x),
        toml::Value::Boolean(b) => Attribute::Bool(b),
        toml::Value::Datetime(dt) => Attribute::String(dt.to_string()),
        toml::Value::Array(items) => Attribute::List(items.into_iter().map(decode).collect()),
        toml::Value::Table(table) => Attribute::Map(
            table
                .into_iter()
                .map(|(key, value)| (key, decode(value)))
                .collect(),
        ),
    }
}

fn is_token(s: &str) -> bool {
    s.len() > 3 && s.starts_with("${") && s.ends_with('}')
}
