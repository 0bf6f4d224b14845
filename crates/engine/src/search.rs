//! Regex search over record descriptions and categories.

use regex::{Regex, RegexBuilder};

use crate::Record;

#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
}

impl SearchPattern {
    /// Compiles a user-typed pattern. An empty or invalid pattern yields
    /// `None`, meaning "no search".
    #[must_use]
    pub fn compile(pattern: &str, case_insensitive: bool) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        match RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
        {
            Ok(regex) => Some(Self { regex }),
            Err(err) => {
                tracing::debug!("ignoring invalid search pattern {pattern:?}: {err}");
                None
            }
        }
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.regex.is_match(&record.description) || self.regex.is_match(&record.category)
    }

    /// Wraps every match in `text` with `open` and `close`.
    #[must_use]
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        self.regex
            .replace_all(text, |caps: &regex::Captures<'_>| {
                format!("{open}{}{close}", &caps[0])
            })
            .into_owned()
    }
}
