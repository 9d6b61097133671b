//! `${VAR}` and `${VAR:-default}` expansion for config strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `field` names the config key in the error when a referenced variable is
/// unset and has no default.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
