//! Regex and placeholder rewrites applied to selected string leaves
//!
//! Rules are compiled once per (target, entry) pair because the placeholder
//! values depend on the locales involved:
//!
//! - in `match`, `{locale}` and `{localeCode}` become the default locale
//! - in `replace`, `{locale}` and `{localeCode}` become the target locale,
//!   `{localeName}` and `{localeNativeName}` its display names
//!
//! Unknown placeholders are left untouched. Replacement strings use
//! JavaScript back-reference syntax (`$1`, `$&`, `$<name>`, `$$`).

use crate::document::select_pointers;
use crate::error::{Error, Result};
use crate::locale;
use crate::schema::TransformRule;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"))
}

/// Values substituted for `{...}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    code: String,
    name: Option<String>,
    native_name: Option<String>,
}

impl Placeholders {
    /// Placeholders for a `match` pattern; the code is regex-escaped
    pub fn for_match(default_locale: &str) -> Self {
        Self {
            code: regex::escape(default_locale),
            name: None,
            native_name: None,
        }
    }

    /// Placeholders for a `replace` template
    pub fn for_replace(target_locale: &str) -> Self {
        Self {
            code: target_locale.to_string(),
            name: Some(locale::display_name(target_locale)),
            native_name: Some(locale::native_name(target_locale)),
        }
    }

    /// Substitute known placeholders in `template`
    pub fn substitute(&self, template: &str) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &Captures| {
                let value = match &caps[1] {
                    "locale" | "localeCode" => Some(&self.code),
                    "localeName" => self.name.as_ref(),
                    "localeNativeName" => self.native_name.as_ref(),
                    _ => None,
                };
                value.cloned().unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Translate a JavaScript replacement string into `regex` expansion syntax.
///
/// `$n`/`$nn` refer to a group only when that group exists; otherwise the
/// `$` is literal, as in `String.prototype.replace`.
pub fn expansion_for(replace: &str, regex: &Regex) -> String {
    let groups = regex.captures_len();
    let has_name = |name: &str| regex.capture_names().flatten().any(|n| n == name);
    let bytes = replace.as_bytes();
    let mut out = String::with_capacity(replace.len() + 8);
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        out.push_str(&replace[literal_start..i]);

        let digit = |at: usize| {
            bytes
                .get(at)
                .filter(|b| b.is_ascii_digit())
                .map(|b| (b - b'0') as usize)
        };

        match bytes.get(i + 1) {
            Some(b'$') => {
                out.push_str("$$");
                i += 2;
            }
            Some(b'&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(b) if b.is_ascii_digit() => {
                let one = (b - b'0') as usize;
                let two = digit(i + 2).map(|d| one * 10 + d);
                match two {
                    Some(n) if n >= 1 && n < groups => {
                        out.push_str(&format!("${{{n}}}"));
                        i += 3;
                    }
                    _ if one >= 1 && one < groups => {
                        out.push_str(&format!("${{{one}}}"));
                        i += 2;
                    }
                    _ => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            Some(b'<') => match replace[i + 2..].find('>') {
                Some(end) if has_name(&replace[i + 2..i + 2 + end]) => {
                    out.push_str(&format!("${{{}}}", &replace[i + 2..i + 2 + end]));
                    i += end + 3;
                }
                _ => {
                    out.push_str("$$");
                    i += 1;
                }
            },
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
        literal_start = i;
    }

    out.push_str(&replace[literal_start..]);
    out
}

#[derive(Debug)]
enum Action {
    Rewrite { regex: Regex, expansion: String },
    Overwrite(String),
    Skip,
}

#[derive(Debug)]
struct CompiledRule {
    path: String,
    action: Action,
}

/// Transform rules compiled for one (default locale, target locale) pair
#[derive(Debug)]
pub struct Transformer {
    rules: Vec<CompiledRule>,
}

impl Transformer {
    /// Compile rules, substituting locale placeholders
    pub fn compile(
        rules: &[(String, TransformRule)],
        default_locale: &str,
        target_locale: &str,
    ) -> Result<Self> {
        let match_values = Placeholders::for_match(default_locale);
        let replace_values = Placeholders::for_replace(target_locale);

        let rules = rules
            .iter()
            .map(|(path, rule)| {
                let replace = rule.replace.as_str().map(|r| replace_values.substitute(r));
                let action = match (&rule.pattern, replace) {
                    (Some(pattern), Some(replace)) => {
                        let pattern = match_values.substitute(pattern);
                        let regex = Regex::new(&pattern).map_err(|source| Error::InvalidPattern {
                            pattern: pattern.clone(),
                            source,
                        })?;
                        let expansion = expansion_for(&replace, &regex);
                        Action::Rewrite { regex, expansion }
                    }
                    (None, Some(replace)) => Action::Overwrite(replace),
                    (_, None) => Action::Skip,
                };
                Ok(CompiledRule {
                    path: path.clone(),
                    action,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Apply every rule to `node`; unresolved paths and non-string leaves are ignored
    pub fn apply(&self, node: &mut Value) -> Result<()> {
        for rule in &self.rules {
            if matches!(rule.action, Action::Skip) {
                continue;
            }
            for pointer in select_pointers(node, &rule.path)? {
                let Some(Value::String(current)) = node.pointer_mut(&pointer) else {
                    continue;
                };
                match &rule.action {
                    Action::Rewrite { regex, expansion } => {
                        let rewritten = regex.replace_all(current, expansion.as_str()).into_owned();
                        *current = rewritten;
                    }
                    Action::Overwrite(text) => *current = text.clone(),
                    Action::Skip => {}
                }
                tracing::trace!(path = %rule.path, %pointer, "transformed leaf");
            }
        }
        Ok(())
    }
}
