//! Position decision for the target rule.
//!
//! Pure logic: given the rule list observed on the filter and the rule that
//! must sit last, decide whether a write is needed and what to write.

/// Outcome of comparing the observed rule list with the desired position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The target rule is already last; nothing to write.
    NoOp,
    /// The full list to write back, with the target rule last.
    Reorder(Vec<String>),
}

/// Decide whether `target` needs to move to the end of `rules`.
///
/// Every occurrence of `target` is dropped from the list and a single one is
/// appended, so duplicates collapse into the trailing entry. Matching is
/// exact string equality.
pub fn decide(rules: &[String], target: &str) -> Action {
    if is_last(rules, target) {
        return Action::NoOp;
    }

    let mut reordered: Vec<String> = rules
        .iter()
        .filter(|rule| rule.as_str() != target)
        .cloned()
        .collect();
    reordered.push(target.to_string());
    Action::Reorder(reordered)
}

/// True when `rules` is non-empty and ends with `target`.
pub fn is_last(rules: &[String], target: &str) -> bool {
    rules.last().is_some_and(|last| last == target)
}
