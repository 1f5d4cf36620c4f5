//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Other braces (e.g. a JSON example inside a prompt) are left untouched.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings. Cuts on a char boundary.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
