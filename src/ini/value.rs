//! Typed interpretation of stored string values

/// A type that can be parsed from a stored configuration value
///
/// Parsing never panics; `None` means the string is not a valid `Self`.
pub trait ConfigValue: Sized {
    /// Human-readable type name used in error messages
    const EXPECTED: &'static str;

    /// Parse a stored (already trimmed) value
    fn parse_value(raw: &str) -> Option<Self>;
}

macro_rules! impl_from_str_value {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn parse_value(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

impl_from_str_value! {
    i32 => "integer",
    i64 => "integer",
    u16 => "unsigned integer",
    u32 => "unsigned integer",
    u64 => "unsigned integer",
    usize => "unsigned integer",
    f32 => "number",
    f64 => "number",
}

impl ConfigValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn parse_value(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}
