//! Prompt template rendering.
//!
//! Templates reference variables as `{{$name}}` (whitespace inside the
//! braces is allowed). Unknown variables render as the empty string.
//! Text that is not a well-formed variable block is copied unchanged.

use farmiq_types::skill::ContextVariables;

/// Render `template`, substituting each `{{$name}}` from `variables`.
pub fn render(template: &str, variables: &ContextVariables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let inner = after_open[..end].trim();
        match inner.strip_prefix('$') {
            Some(name) if is_variable_name(name) => {
                match variables.get(name) {
                    Some(value) => out.push_str(value),
                    None => tracing::debug!(variable = name, "template variable not set"),
                }
            }
            _ => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Names of the variables referenced by `template`, in first-use order.
pub fn variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };
        if let Some(name) = after_open[..end].trim().strip_prefix('$') {
            if is_variable_name(name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        rest = &after_open[end + 2..];
    }
    names
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
