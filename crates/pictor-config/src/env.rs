use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// `{{ env.VAR | default("fallback") }}` substitutes the fallback when the
/// variable is unset. Comment lines are left untouched so that disabled
/// settings never require their variables to exist.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 1: scoped key, 2: optional default("...") value
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut failure = None;

    let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
        let key = &captures[1];
        let fallback = captures.get(2).map(|m| m.as_str());

        match lookup(key, fallback) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn lookup(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}
