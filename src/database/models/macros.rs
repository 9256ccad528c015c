/// VARCHAR-backed enums. Each variant maps to a canonical lowercase form
/// via `as_str`; Display, FromStr and the sqlx traits all go through it so
/// the stored text and the API text can never drift apart.
macro_rules! string_enum {
    (
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Canonical form, as written to the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }

            fn parse(value: &str) -> Option<Self> {
                $(
                    if value.eq_ignore_ascii_case($text) {
                        return Some(Self::$variant);
                    }
                )*
                None
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value)
                    .ok_or_else(|| format!("unknown {} value: {value}", stringify!($name)))
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Self::parse(text)
                    .ok_or_else(|| format!("unknown {} value: {text}", stringify!($name)).into())
            }
        }
    };
}

pub(crate) use string_enum;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    string_enum! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Beverage {
            Coffee => "coffee",
            Tea => "tea",
        }
    }

    #[test]
    fn canonical_form_round_trips() {
        assert_eq!(Beverage::Coffee.as_str(), "coffee");
        assert_eq!(Beverage::Tea.to_string(), "tea");
        assert_eq!("coffee".parse::<Beverage>().unwrap(), Beverage::Coffee);
    }

    #[test]
    fn parsing_ignores_ascii_case() {
        assert_eq!("TEA".parse::<Beverage>().unwrap(), Beverage::Tea);
    }

    #[test]
    fn unknown_values_are_rejected() {
        let err = "juice".parse::<Beverage>().unwrap_err();
        assert!(err.contains("Beverage"));
        assert!(err.contains("juice"));
    }
}
