//! `${VAR}` and `${VAR:-default}` expansion for string settings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `field` names the setting in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(var) => Ok(Some(var)),
        Err(_) => Err(LookupError {
            var_name: name.to_owned(),
        }),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

#[derive(Debug)]
struct LookupError {
    var_name: String,
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not set", self.var_name)
    }
}

impl std::error::Error for LookupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_unchanged() {
        assert_eq!(expand_env("/docs/", "render.link_base").unwrap(), "/docs/");
    }

    #[test]
    fn test_expands_set_variable() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("LUCENT_EXPAND_TEST_BASE", "https://cdn.example.com");
        }
        assert_eq!(
            expand_env("${LUCENT_EXPAND_TEST_BASE}/assets", "render.link_base").unwrap(),
            "https://cdn.example.com/assets"
        );
        unsafe {
            std::env::remove_var("LUCENT_EXPAND_TEST_BASE");
        }
    }

    #[test]
    fn test_default_applies_when_unset() {
        assert_eq!(
            expand_env("${LUCENT_EXPAND_TEST_UNSET:-/fallback}", "render.link_path").unwrap(),
            "/fallback"
        );
    }

    #[test]
    fn test_missing_variable_names_field() {
        let err = expand_env("${LUCENT_EXPAND_TEST_MISSING}", "render.link_path").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("render.link_path"));
        assert!(msg.contains("${LUCENT_EXPAND_TEST_MISSING} not set"));
    }
}
