//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::settings::BuildType;

    /// Generate a valid package name (lowercase alphanumeric with hyphens)
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,30}[a-z0-9]?".prop_filter("Name must not be empty", |s| !s.is_empty())
    }

    /// Generate a valid semver version string
    pub fn semver_version() -> impl Strategy<Value = String> {
        (0u32..100, 0u32..100, 0u32..100)
            .prop_map(|(major, minor, patch)| format!("{major}.{minor}.{patch}"))
    }

    /// Generate an accepted spelling of a boolean option value
    pub fn option_literal() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("True".to_string()),
            Just("False".to_string()),
            Just("true".to_string()),
            Just("false".to_string()),
        ]
    }

    /// Generate any build type
    pub fn build_type() -> impl Strategy<Value = BuildType> {
        prop_oneof![
            Just(BuildType::Debug),
            Just(BuildType::Release),
            Just(BuildType::RelWithDebInfo),
            Just(BuildType::MinSizeRel),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::core::resolver::is_valid_token;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_package_name_is_valid_token(name in package_name()) {
            prop_assert!(is_valid_token(&name));
        }

        #[test]
        fn prop_semver_version_parses(version in semver_version()) {
            prop_assert!(semver::Version::parse(&version).is_ok());
        }

        #[test]
        fn prop_option_literal_is_boolean(literal in option_literal()) {
            prop_assert!(
                literal.eq_ignore_ascii_case("true") || literal.eq_ignore_ascii_case("false")
            );
        }
    }
}
