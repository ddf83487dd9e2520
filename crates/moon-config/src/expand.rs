//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Strings without `${` are returned unchanged, so bare `$VAR` is left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MOON_TEST_HOST", "0.0.0.0");
        }
        assert_eq!(expand_env("${MOON_TEST_HOST}", "server.host").unwrap(), "0.0.0.0");
        assert_eq!(
            expand_env("${MOON_TEST_HOST:-localhost}", "server.host").unwrap(),
            "0.0.0.0"
        );
        unsafe {
            std::env::remove_var("MOON_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MOON_TEST_UNSET_DIR");
        }
        assert_eq!(
            expand_env("${MOON_TEST_UNSET_DIR:-public}", "assets.public_dir").unwrap(),
            "public"
        );
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MOON_TEST_MISSING");
        }
        let err = expand_env("${MOON_TEST_MISSING}", "server.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MOON_TEST_MISSING"));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("$HOME/site", "assets.public_dir").unwrap(), "$HOME/site");
    }
}
