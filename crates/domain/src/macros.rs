//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Roles and views travel as human-readable names ("Team Lead",
//! "Internal Admin"). This macro provides both conversions from a single
//! mapping so the wire spelling lives in one place.
//!
//! # Example
//!
//! ```rust
//! use dailytrack_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shift {
//!     Day,
//!     Night,
//! }
//!
//! impl_wire_name_conversions!(Shift {
//!     Day => "Day Shift",
//!     Night => "Night Shift",
//! });
//!
//! assert_eq!(Shift::Night.to_string(), "Night Shift");
//! assert_eq!("day shift".parse::<Shift>().unwrap(), Shift::Day);
//! ```

/// Implements Display and FromStr traits for enums with a wire name
///
/// This macro generates:
/// - Display trait: writes the exact wire name
/// - FromStr trait: parses wire names case-insensitively (ASCII)
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire name of this variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
