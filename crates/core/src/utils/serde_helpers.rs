//! Serde helpers for the loosely-typed JSON the host sends

use serde::{Deserialize, Deserializer};

/// Macro to implement case-insensitive deserialization for fieldless enums
///
/// Strings that match none of the listed values map to the fallback variant,
/// so a new source type in a recipe never breaks parsing of the whole module.
///
/// Usage:
/// ```ignore
/// impl_case_insensitive_deserialize!(
///     MyEnum,
///     fallback = Unknown,
///     Variant1 => "variant1",
///     Variant2 => "variant2"
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, fallback = $fallback:ident, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <Option<String> as serde::Deserialize>::deserialize(deserializer)?
                    .unwrap_or_default();
                match s.to_lowercase().as_str() {
                    $(
                        $str_val => Ok(Self::$variant),
                    )+
                    _ => Ok(Self::$fallback),
                }
            }
        }
    };
}

/// Deserializes `null` as the type's default instead of failing
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
