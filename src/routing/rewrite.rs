//! Anchored prefix path rewriting.

use crate::config::PathRewriteRule;

/// Applies the first rewrite rule whose prefix matches.
#[derive(Debug, Clone, Default)]
pub struct PathRewriter {
    rules: Vec<(String, String)>,
}

impl PathRewriter {
    pub fn new(rules: &[PathRewriteRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|r| (r.prefix().to_string(), r.replacement.clone()))
                .collect(),
        }
    }

    /// Rewrite `path`. The result always starts with `/`.
    pub fn rewrite(&self, path: &str) -> String {
        let rewritten = self
            .rules
            .iter()
            .find_map(|(prefix, replacement)| {
                path.strip_prefix(prefix.as_str())
                    .map(|rest| format!("{replacement}{rest}"))
            })
            .unwrap_or_else(|| path.to_string());

        if rewritten.starts_with('/') {
            rewritten
        } else {
            format!("/{rewritten}")
        }
    }
}
