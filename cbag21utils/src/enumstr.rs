//!
//! # Enum-String Mapping Module
//!
//! Defines the [enumstr] macro and paired [EnumStr] trait,
//! mapping fieldless enums to and from fixed strings.
//! Rule-files name orientations, spacing-types, and blockage-types this way.
//!

///
/// # String-Enumeration Trait
///
/// * `to_str(&self) -> &'static str` converts the enum to its string value.
/// * `from_str(&str) -> Option<Self>` does the opposite.
///
pub trait EnumStr: std::marker::Sized {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
}

///
/// # Enum-String Pairing Macro
///
/// Creates an `enum` which:
/// * Has paired string-values
/// * Implements [EnumStr], [std::fmt::Display], and [std::str::FromStr] over them
/// * Derives `serde::{Serialize, Deserialize}` using those same strings
///
/// Callers must have `serde::{Serialize, Deserialize}` and [EnumStr] in scope.
///
/// ```rust
/// use cbag21utils::{enumstr, EnumStr};
/// use serde::{Deserialize, Serialize};
///
/// enumstr!(
///     /// # Wire Directions
///     WireDir {
///         Horizontal: "x",
///         Vertical: "y",
///     }
/// );
/// assert_eq!(WireDir::Vertical.to_str(), "y");
/// assert_eq!("x".parse::<WireDir>(), Ok(WireDir::Horizontal));
/// ```
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $( #[doc=$strval]
               #[serde(rename=$strval)]
                $variant ),*
        }
        impl EnumStr for $enum_name {
            /// Convert to the paired (static) string value.
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Create from one of the string-values. Case sensitive.
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
        }
        impl ::std::str::FromStr for $enum_name {
            type Err = String;
            fn from_str(txt: &str) -> Result<Self, Self::Err> {
                <Self as EnumStr>::from_str(txt)
                    .ok_or_else(|| format!("Invalid {}: {}", stringify!($enum_name), txt))
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", self.to_str())
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    enumstr!(
        /// # Spacing Kinds
        Spacing {
            Same: "same",
            Diff: "diff",
        }
    );

    #[test]
    fn test_enumstr() {
        assert_eq!(Spacing::Same.to_str(), "same");
        assert_eq!(<Spacing as EnumStr>::from_str("diff"), Some(Spacing::Diff));
        assert_eq!(<Spacing as EnumStr>::from_str("DIFF"), None);
        assert_eq!("same".parse::<Spacing>(), Ok(Spacing::Same));
        assert!("other".parse::<Spacing>().is_err());
        assert_eq!(format!("{}", Spacing::Diff), "diff");
    }
    #[test]
    fn test_enumstr_serde() -> Result<(), crate::ser::Error> {
        let fmt = crate::SerializationFormat::Yaml;
        let s: Spacing = fmt.from_str("same")?;
        assert_eq!(s, Spacing::Same);
        let v: Vec<Spacing> = fmt.from_str("[diff, same]")?;
        assert_eq!(v, vec![Spacing::Diff, Spacing::Same]);
        Ok(())
    }
}
