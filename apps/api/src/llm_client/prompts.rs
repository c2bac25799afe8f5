// Shared prompt fragments. Each stage that calls the model keeps its own
// prompts.rs alongside it and pulls these in.

/// Appended to every system prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Substitutes `{name}` placeholders in a single pass, so text inserted for
/// one placeholder is never scanned for another.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = vars.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_known_placeholders() {
        let out = fill_template("A {x} B {y}", &[("x", "1"), ("y", "2")]);
        assert_eq!(out, "A 1 B 2");
    }

    #[test]
    fn test_fill_template_leaves_unknown_braces() {
        let out = fill_template(r#"{"a": {x}}"#, &[("x", "1")]);
        assert_eq!(out, r#"{"a": 1}"#);
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_text() {
        let out = fill_template("{x} / {y}", &[("x", "{y}"), ("y", "2")]);
        assert_eq!(out, "{y} / 2");
    }
}
