use serde_json::{Map, Value};

/// Split a CamelCase identifier into space separated words.
///
/// A word ends between a lowercase and an uppercase letter, and before the
/// last capital of an acronym that starts a new word:
/// `"HTTPServerError"` becomes `"HTTP Server Error"`.
pub fn camel_case_to_str(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());

        let boundary = (prev.is_ascii_lowercase() && cur.is_ascii_uppercase())
            || (prev.is_ascii_uppercase() && cur.is_ascii_uppercase() && next_is_lower);

        if boundary {
            words.push(chars[start..i].iter().collect());
            start = i;
        }
    }

    if start < chars.len() {
        words.push(chars[start..].iter().collect());
    }

    words.join(" ")
}

/// Turn a JSON object into command line arguments.
///
/// `true` becomes a bare `--key` flag and `false` is left out. Strings are
/// passed as-is after `--key`; any other value is passed as its JSON text.
pub fn json_to_argv(data: &Map<String, Value>) -> Vec<String> {
    let mut argv = Vec::with_capacity(data.len() * 2);

    for (key, value) in data {
        match value {
            Value::Bool(true) => argv.push(format!("--{key}")),
            Value::Bool(false) => {}
            Value::String(s) => {
                argv.push(format!("--{key}"));
                argv.push(s.clone());
            }
            other => {
                argv.push(format!("--{key}"));
                argv.push(other.to_string());
            }
        }
    }

    argv
}

/// Format a byte count with the largest fitting binary unit
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
