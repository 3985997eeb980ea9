// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${NAME}` environment-variable interpolation over string config values.

use crate::error::ConfigError;

/// Replace every `${NAME}` occurrence in `value` with the named environment
/// variable. Missing required variables are a validation error; missing
/// optional ones are left as the literal `${NAME}` text, matching the
/// original's `_resolve_env` behavior.
pub fn resolve(value: &str, required: bool) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(end) = value[i + 2..].find('}') {
                let name = &value[i + 2..i + 2 + end];
                match std::env::var(name) {
                    Ok(val) => out.push_str(&val),
                    Err(_) if required => return Err(ConfigError::MissingEnvVar(name.to_string())),
                    Err(_) => out.push_str(&value[i..i + 3 + end]),
                }
                i += 3 + end;
                continue;
            }
        }
        let ch = value[i..].chars().next().expect("valid utf8 boundary");
        out.push(ch);
        i += ch.len_utf8();
    }
    Ok(out)
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
