//! ignore rules applied to manifest names

use std::fs;
use std::path::Path;

use glob::Pattern;

use crate::manifest::HashItem;

/// file name of the ignore list at the root of a tree
pub const IGNORE_FILE: &str = ".benchignore";

/// decides whether a manifest name is left out of the manifest
pub trait Filter: Sync {
    /// true means "exclude"
    fn is_excluded(&self, name: &str) -> bool;
}

/// excludes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFilter;

impl Filter for NoFilter {
    fn is_excluded(&self, _name: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
enum Rule {
    /// pattern ending in `/`: matches every name below that directory
    Prefix(String),
    Glob { raw: String, pattern: Option<Pattern> },
}

/// rules loaded from a `.benchignore` file
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    rules: Vec<Rule>,
}

impl IgnoreFilter {
    /// build from the text of an ignore file
    ///
    /// blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Self {
        let mut filter = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            filter.add(line);
        }
        filter
    }

    /// load `dir/.benchignore`; a missing or unreadable file gives an empty filter
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(IGNORE_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let filter = Self::parse(&text);
                tracing::debug!(path = %path.display(), rules = filter.len(), "loaded ignore file");
                filter
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read ignore file");
                Self::default()
            }
        }
    }

    /// add one rule
    pub fn add(&mut self, rule: &str) {
        if rule.ends_with('/') {
            self.rules.push(Rule::Prefix(rule.to_string()));
            return;
        }

        let pattern = match Pattern::new(rule) {
            Ok(p) => Some(p),
            Err(e) => {
                // still usable as an exact-name rule
                tracing::warn!(rule, error = %e, "invalid ignore pattern");
                None
            }
        };
        self.rules.push(Rule::Glob {
            raw: rule.to_string(),
            pattern,
        });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Filter for IgnoreFilter {
    fn is_excluded(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| match rule {
            Rule::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Rule::Glob { raw, pattern } => {
                name == raw || pattern.as_ref().is_some_and(|p| p.matches(name))
            }
        })
    }
}

/// keep the items the filter does not exclude, returning them and the drop count
pub fn apply(items: Vec<HashItem>, filter: &dyn Filter) -> (Vec<HashItem>, usize) {
    let before = items.len();
    let kept: Vec<HashItem> = items
        .into_iter()
        .filter(|item| !filter.is_excluded(&item.name))
        .collect();
    let ignored = before - kept.len();
    tracing::info!(ignored, "applied ignore rules");
    (kept, ignored)
}
