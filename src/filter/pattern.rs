//! Compiled include/exclude pattern sets.

use regex::Regex;

use crate::error::FilterConfigurationError;
use crate::filter::configuration::StringFilterConfiguration;

/// Whole-value regex matchers.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn compile(patterns: &[String]) -> Result<Self, FilterConfigurationError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let invalid = |e: regex::Error| FilterConfigurationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                };
                // Anchoring is only sound once the pattern parses on its own.
                Regex::new(pattern).map_err(invalid)?;
                Regex::new(&format!("^(?:{pattern})$")).map_err(invalid)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, value: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(value))
    }
}

/// Exclusion wins over inclusion; an empty include set accepts everything not excluded.
#[derive(Debug, Clone, Default)]
pub struct IncludeExclude {
    includes: PatternSet,
    excludes: PatternSet,
}

impl IncludeExclude {
    pub fn compile(config: &StringFilterConfiguration) -> Result<Self, FilterConfigurationError> {
        Ok(Self {
            includes: PatternSet::compile(&config.includes)?,
            excludes: PatternSet::compile(&config.excludes)?,
        })
    }

    /// Accept if no candidate is excluded and, when includes exist, some candidate is included.
    pub fn accepts<'a>(&self, candidates: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        if candidates.clone().into_iter().any(|c| self.excludes.matches(c)) {
            return false;
        }
        self.includes.is_empty() || candidates.into_iter().any(|c| self.includes.matches(c))
    }
}
