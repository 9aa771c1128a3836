//! Holder name detection.
//!
//! Names carry no label on most identity cards, so detection is an ordered
//! cascade of passes over the line list. Within a pass the lines are scanned
//! top to bottom and the first line any of the pass's rules accepts wins.
//! Later passes run only when an earlier one found nothing.

use super::patterns::{DATE_DMY, NAME_EXCLUSIONS, PROPER_CASE_NAME, UPPERCASE_LABEL};

/// Which rule produced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRuleKind {
    /// `John Smith` shaped line.
    ProperCase,
    /// `JOHN SMITH` shaped line that is not a known card label.
    UppercaseLabel,
    /// Line directly above the date of birth.
    PrecedesDateOfBirth,
}

impl std::fmt::Display for NameRuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameRuleKind::ProperCase => write!(f, "proper-case"),
            NameRuleKind::UppercaseLabel => write!(f, "uppercase-label"),
            NameRuleKind::PrecedesDateOfBirth => write!(f, "precedes-dob"),
        }
    }
}

/// A single name detection rule.
pub trait NameRule: Send + Sync {
    /// Rule identifier.
    fn kind(&self) -> NameRuleKind;

    /// Whether the line triggers this rule.
    fn matches(&self, line: &str) -> bool;

    /// Index of the candidate line for a triggering line at `index`.
    ///
    /// Returning `None` lets the scan continue with the next line.
    fn candidate(&self, _lines: &[String], index: usize) -> Option<usize> {
        Some(index)
    }
}

/// Two or more capitalized words.
pub struct ProperCaseName;

impl NameRule for ProperCaseName {
    fn kind(&self) -> NameRuleKind {
        NameRuleKind::ProperCase
    }

    fn matches(&self, line: &str) -> bool {
        PROPER_CASE_NAME.is_match(line)
    }
}

/// Six or more uppercase letters and spaces, excluding card boilerplate.
pub struct UppercaseLabel;

impl NameRule for UppercaseLabel {
    fn kind(&self) -> NameRuleKind {
        NameRuleKind::UppercaseLabel
    }

    fn matches(&self, line: &str) -> bool {
        if !UPPERCASE_LABEL.is_match(line) {
            return false;
        }
        let upper = line.to_uppercase();
        !NAME_EXCLUSIONS.iter().any(|word| upper.contains(word))
    }
}

/// The line above the first line mentioning `DOB` or a day-first date.
pub struct DateOfBirthNeighbor;

impl NameRule for DateOfBirthNeighbor {
    fn kind(&self) -> NameRuleKind {
        NameRuleKind::PrecedesDateOfBirth
    }

    fn matches(&self, line: &str) -> bool {
        line.contains("DOB") || DATE_DMY.is_match(line)
    }

    fn candidate(&self, _lines: &[String], index: usize) -> Option<usize> {
        // A date on the very first line has nothing above it
        index.checked_sub(1)
    }
}

/// Detected name with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    pub value: String,
    pub rule: NameRuleKind,
    /// Index of the line the name was taken from.
    pub line_index: usize,
}

/// Rules that share one top-to-bottom scan.
pub type NamePass = Vec<Box<dyn NameRule>>;

/// Prioritized passes of name rules.
pub struct NameCascade {
    passes: Vec<NamePass>,
}

impl NameCascade {
    /// Create a cascade from passes in priority order.
    pub fn new(passes: Vec<NamePass>) -> Self {
        Self { passes }
    }

    /// Rule kinds in evaluation order.
    pub fn rule_kinds(&self) -> Vec<NameRuleKind> {
        self.passes.iter().flatten().map(|r| r.kind()).collect()
    }

    /// Run the cascade over trimmed, non-empty lines.
    pub fn detect(&self, lines: &[String]) -> Option<NameMatch> {
        self.passes.iter().find_map(|pass| Self::scan(pass, lines))
    }

    fn scan(pass: &[Box<dyn NameRule>], lines: &[String]) -> Option<NameMatch> {
        for (index, line) in lines.iter().enumerate() {
            for rule in pass {
                if !rule.matches(line) {
                    continue;
                }
                let Some(line_index) = rule.candidate(lines, index) else {
                    continue;
                };
                let Some(value) = lines.get(line_index).map(|l| l.trim()) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                return Some(NameMatch {
                    value: value.to_string(),
                    rule: rule.kind(),
                    line_index,
                });
            }
        }
        None
    }
}

impl Default for NameCascade {
    fn default() -> Self {
        Self::new(vec![
            vec![Box::new(ProperCaseName), Box::new(UppercaseLabel)],
            vec![Box::new(DateOfBirthNeighbor)],
        ])
    }
}
