pub fn env_var_non_empty(name: &str) -> bool {
    env_var_if_non_empty(name).is_some()
}

/// The value of an env var, treating an empty value as unset.
pub fn env_var_if_non_empty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}
