/// Generate `as_str`, `ALL`, `Display`, `From<T> for String` and
/// `TryFrom<String> for T` for a closed, fieldless enum.
///
/// Unknown strings are rejected; there is no catch-all variant, so a `match`
/// over the enum stays exhaustive. Put
/// `#[serde(into = "String", try_from = "String")]` on the enum to route
/// serde through these impls (the enum must be `Clone`).
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                match s.as_str() {
                    $($str => Ok($name::$variant),)+
                    "" => Err(format!("{} cannot be empty", stringify!($name))),
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }
    };
}
