//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// First non-empty value among the given variables.
#[must_use]
pub fn env_first(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_owned())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns a unique variable name; process env is shared across threads.

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "PLANBOT_TEST_ENV_PARSE_VALID_4411";
        unsafe { std::env::set_var(var_name, "42") };
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "PLANBOT_TEST_ENV_PARSE_INVALID_4412";
        unsafe { std::env::set_var(var_name, "banana") };
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_missing_var() {
        let result: i32 = env_parse_with_default("PLANBOT_TEST_ENV_PARSE_MISSING_4413", -3);
        assert_eq!(result, -3);
    }

    #[test]
    fn test_env_first_skips_blank() {
        let blank = "PLANBOT_TEST_ENV_FIRST_BLANK_4414";
        let set = "PLANBOT_TEST_ENV_FIRST_SET_4415";
        unsafe {
            std::env::set_var(blank, "  ");
            std::env::set_var(set, "key");
        }
        assert_eq!(env_first(&[blank, set]).as_deref(), Some("key"));
        unsafe {
            std::env::remove_var(blank);
            std::env::remove_var(set);
        }
    }
}
