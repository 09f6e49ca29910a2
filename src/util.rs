//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Extract the first balanced JSON object from free text.
///
/// Local chat models often wrap their JSON answer in prose or code fences,
/// so we scan for the first `{` and return the slice up to its matching `}`,
/// respecting string literals and escapes.
pub fn extract_json_object(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let bytes = text.as_bytes();
  let mut depth = 0usize;
  let mut in_str = false;
  let mut escaped = false;
  for (i, &b) in bytes.iter().enumerate().skip(start) {
    if in_str {
      if escaped {
        escaped = false;
      } else if b == b'\\' {
        escaped = true;
      } else if b == b'"' {
        in_str = false;
      }
      continue;
    }
    match b {
      b'"' => in_str = true,
      b'{' => depth += 1,
      b'}' => {
        depth -= 1;
        if depth == 0 {
          return Some(&text[start..=i]);
        }
      }
      _ => {}
    }
  }
  None
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_keys() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn extract_json_from_plain_object() {
    let s = r#"{"message": "well done"}"#;
    assert_eq!(extract_json_object(s), Some(s));
  }

  #[test]
  fn extract_json_from_fenced_prose() {
    let s = "Sure! Here is the JSON:\n```json\n{\"tip\": \"rest {5} minutes\", \"n\": {\"k\": 1}}\n```\nHope it helps.";
    let got = extract_json_object(s).expect("object");
    assert_eq!(got, "{\"tip\": \"rest {5} minutes\", \"n\": {\"k\": 1}}");
  }

  #[test]
  fn extract_json_respects_braces_inside_strings() {
    let s = r#"noise {"a": "}{", "b": 2} tail"#;
    assert_eq!(extract_json_object(s), Some(r#"{"a": "}{", "b": 2}"#));
  }

  #[test]
  fn extract_json_none_when_unbalanced() {
    assert_eq!(extract_json_object("{\"a\": 1"), None);
    assert_eq!(extract_json_object("no object here"), None);
  }
}
