//! Ordered, multi-strategy matching of a raw identifier against cached
//! entries.
//!
//! Strategies run in the order given. The first one that yields any
//! candidate decides the outcome: one candidate is a match, several are an
//! ambiguity. Only [`Strategy::ExactId`] may pick the first of several
//! candidates, because IDs are unique within a listing.

use crate::cache::Lookup;
use crate::error::Candidate;

use super::reference::IssueRef;

/// Issue identity carried by issue-backed entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryRef<'a> {
  pub owner: &'a str,
  pub repo: &'a str,
  pub number: u64,
}

/// An entry the matcher can compare identifiers against.
pub trait Matchable {
  fn match_id(&self) -> &str;

  /// Human-readable names compared by the name and substring strategies.
  fn match_names(&self) -> Vec<&str>;

  /// Name shown when listing ambiguous candidates.
  fn display_name(&self) -> String;

  fn login(&self) -> Option<&str> {
    None
  }

  fn reference(&self) -> Option<EntryRef<'_>> {
    None
  }

  fn candidate(&self) -> Candidate {
    Candidate {
      id: self.match_id().to_string(),
      name: self.display_name(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  /// Identifier equals the entry ID, case-sensitive
  ExactId,
  /// `owner/repo#number` or `repo#number` against issue-backed entries
  Reference,
  /// Any name equals the identifier, case-insensitive
  ExactName,
  /// GitHub login equals the identifier, case-insensitive
  Login,
  /// Any name contains the identifier, case-insensitive
  Substring,
}

/// Three-way result of matching one identifier.
#[derive(Debug)]
pub enum MatchOutcome<'a, T> {
  Matched(&'a T),
  Ambiguous(Vec<&'a T>),
  NoMatch,
}

/// Outcomes compare by the IDs of the entries they hold.
impl<'a, T: Matchable> PartialEq for MatchOutcome<'a, T> {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (MatchOutcome::Matched(a), MatchOutcome::Matched(b)) => a.match_id() == b.match_id(),
      (MatchOutcome::Ambiguous(a), MatchOutcome::Ambiguous(b)) => {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.match_id() == y.match_id())
      }
      (MatchOutcome::NoMatch, MatchOutcome::NoMatch) => true,
      _ => false,
    }
  }
}

impl<'a, T: Matchable> MatchOutcome<'a, T> {
  pub fn matched(&self) -> Option<&'a T> {
    match self {
      MatchOutcome::Matched(entry) => Some(*entry),
      _ => None,
    }
  }

  pub fn into_lookup<R>(self, identifier: &str) -> Lookup<R>
  where
    R: for<'e> From<&'e T>,
  {
    match self {
      MatchOutcome::Matched(entry) => Lookup::Found(R::from(entry)),
      MatchOutcome::Ambiguous(entries) => Lookup::Ambiguous {
        identifier: identifier.to_string(),
        candidates: entries.iter().map(|e| e.candidate()).collect(),
      },
      MatchOutcome::NoMatch => Lookup::Missing(vec![identifier.to_string()]),
    }
  }
}

/// Apply `strategies` in order and report the first decisive result.
pub fn match_entries<'a, T: Matchable>(
  entries: &'a [T],
  identifier: &str,
  strategies: &[Strategy],
) -> MatchOutcome<'a, T> {
  let folded = identifier.to_lowercase();

  for strategy in strategies {
    let hits: Vec<&T> = match strategy {
      Strategy::ExactId => {
        if let Some(entry) = entries.iter().find(|e| e.match_id() == identifier) {
          return MatchOutcome::Matched(entry);
        }
        continue;
      }
      Strategy::Reference => {
        let Some(wanted) = IssueRef::parse(identifier) else {
          continue;
        };
        entries
          .iter()
          .filter(|e| e.reference().is_some_and(|r| wanted.matches(r)))
          .collect()
      }
      Strategy::ExactName => entries
        .iter()
        .filter(|e| e.match_names().iter().any(|n| n.to_lowercase() == folded))
        .collect(),
      Strategy::Login => entries
        .iter()
        .filter(|e| e.login().is_some_and(|l| l.to_lowercase() == folded))
        .collect(),
      Strategy::Substring => entries
        .iter()
        .filter(|e| {
          e.match_names()
            .iter()
            .any(|n| n.to_lowercase().contains(&folded))
        })
        .collect(),
    };

    match hits.len() {
      0 => continue,
      1 => return MatchOutcome::Matched(hits[0]),
      _ => return MatchOutcome::Ambiguous(hits),
    }
  }

  MatchOutcome::NoMatch
}

/// Look one identifier up in `entries`.
pub fn lookup_one<T, R>(entries: &[T], identifier: &str, strategies: &[Strategy]) -> Lookup<R>
where
  T: Matchable,
  R: for<'e> From<&'e T>,
{
  match_entries(entries, identifier, strategies).into_lookup(identifier)
}

/// Look several identifiers up in `entries`.
///
/// The first ambiguity settles the whole lookup. Otherwise every identifier
/// that matched nothing is reported together.
pub fn lookup_each<T, R>(entries: &[T], identifiers: &[&str], strategies: &[Strategy]) -> Lookup<Vec<R>>
where
  T: Matchable,
  R: for<'e> From<&'e T>,
{
  let mut found = Vec::with_capacity(identifiers.len());
  let mut missing = Vec::new();

  for identifier in identifiers {
    match match_entries(entries, identifier, strategies) {
      MatchOutcome::Matched(entry) => found.push(R::from(entry)),
      MatchOutcome::NoMatch => missing.push(identifier.to_string()),
      MatchOutcome::Ambiguous(hits) => {
        return Lookup::Ambiguous {
          identifier: identifier.to_string(),
          candidates: hits.iter().map(|e| e.candidate()).collect(),
        }
      }
    }
  }

  if missing.is_empty() {
    Lookup::Found(found)
  } else {
    Lookup::Missing(missing)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug)]
  struct Entry {
    id: &'static str,
    name: &'static str,
    alt: Option<&'static str>,
  }

  impl Matchable for Entry {
    fn match_id(&self) -> &str {
      self.id
    }

    fn match_names(&self) -> Vec<&str> {
      std::iter::once(self.name).chain(self.alt).collect()
    }

    fn display_name(&self) -> String {
      self.name.to_string()
    }
  }

  impl From<&Entry> for String {
    fn from(e: &Entry) -> Self {
      e.id.to_string()
    }
  }

  const ALL: &[Strategy] = &[Strategy::ExactId, Strategy::ExactName, Strategy::Substring];

  fn entry(id: &'static str, name: &'static str) -> Entry {
    Entry {
      id,
      name,
      alt: None,
    }
  }

  fn pipelines() -> Vec<Entry> {
    vec![
      entry("p1", "New Issues"),
      entry("p2", "In Development"),
      entry("p3", "Code Review"),
    ]
  }

  #[test]
  fn test_exact_id_beats_substring_matches() {
    let entries = vec![entry("dev", "Dev Backlog"), entry("x1", "Dev"), entry("x2", "In Dev")];
    let outcome = match_entries(&entries, "dev", ALL);
    assert_eq!(outcome.matched().map(|e| e.id), Some("dev"));
  }

  #[test]
  fn test_exact_id_is_case_sensitive() {
    let entries = pipelines();
    let outcome = match_entries(&entries, "P2", ALL);
    assert_eq!(outcome, MatchOutcome::NoMatch);
  }

  #[test]
  fn test_exact_name_is_case_insensitive() {
    let entries = pipelines();
    let a = match_entries(&entries, "code review", ALL);
    let b = match_entries(&entries, "Code Review", ALL);
    assert_eq!(a.matched().map(|e| e.id), Some("p3"));
    assert_eq!(a, b);
  }

  #[test]
  fn test_exact_name_beats_substring() {
    let entries = vec![entry("a", "Done"), entry("b", "Done Done")];
    let outcome = match_entries(&entries, "done", ALL);
    assert_eq!(outcome.matched().map(|e| e.id), Some("a"));
  }

  #[test]
  fn test_unique_substring() {
    let entries = pipelines();
    assert_eq!(
      match_entries(&entries, "Review", ALL).matched().map(|e| e.id),
      Some("p3")
    );
    assert_eq!(
      match_entries(&entries, "dev", ALL).matched().map(|e| e.id),
      Some("p2")
    );
  }

  #[test]
  fn test_ambiguous_substring_lists_candidates() {
    let entries = pipelines();
    match match_entries(&entries, "e", ALL) {
      MatchOutcome::Ambiguous(hits) => {
        let ids: Vec<&str> = hits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
      }
      other => panic!("expected ambiguity, got {:?}", other),
    }
  }

  #[test]
  fn test_duplicate_exact_names_are_ambiguous() {
    let entries = vec![entry("u1", "Alex"), entry("u2", "alex")];
    assert!(matches!(
      match_entries(&entries, "ALEX", ALL),
      MatchOutcome::Ambiguous(ref hits) if hits.len() == 2
    ));
  }

  #[test]
  fn test_second_name_field_matches() {
    let entries = vec![Entry {
      id: "s1",
      name: "Launch",
      alt: Some("Sprint: Oct 12 - Oct 26"),
    }];
    assert!(match_entries(&entries, "sprint: oct 12 - oct 26", ALL)
      .matched()
      .is_some());
    assert!(match_entries(&entries, "oct 12", ALL).matched().is_some());
  }

  #[test]
  fn test_entry_matching_on_two_names_counts_once() {
    let entries = vec![Entry {
      id: "s1",
      name: "Review week",
      alt: Some("Review sprint"),
    }];
    assert!(match_entries(&entries, "review", ALL).matched().is_some());
  }

  #[test]
  fn test_no_substring_when_strategy_absent() {
    let entries = pipelines();
    let exact_only = &[Strategy::ExactId, Strategy::ExactName];
    assert_eq!(
      match_entries(&entries, "Review", exact_only),
      MatchOutcome::NoMatch
    );
  }

  #[test]
  fn test_lookup_each_collects_all_missing() {
    let entries = pipelines();
    let lookup: Lookup<Vec<String>> =
      lookup_each(&entries, &["p1", "nope", "Code Review", "gone"], ALL);
    assert_eq!(
      lookup,
      Lookup::Missing(vec!["nope".to_string(), "gone".to_string()])
    );
  }

  #[test]
  fn test_lookup_each_found_in_order() {
    let entries = pipelines();
    let lookup: Lookup<Vec<String>> = lookup_each(&entries, &["p3", "new issues"], ALL);
    assert_eq!(
      lookup,
      Lookup::Found(vec!["p3".to_string(), "p1".to_string()])
    );
  }

  #[test]
  fn test_lookup_each_stops_at_ambiguity() {
    let entries = vec![entry("l1", "X"), entry("l2", "x"), entry("l3", "bug")];
    let lookup: Lookup<Vec<String>> = lookup_each(&entries, &["bug", "x", "nope"], ALL);
    match lookup {
      Lookup::Ambiguous {
        identifier,
        candidates,
      } => {
        assert_eq!(identifier, "x");
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2"]);
      }
      other => panic!("expected ambiguity, got {:?}", other),
    }
  }

  #[test]
  fn test_outcomes_compare_by_id() {
    let a = pipelines();
    let b = pipelines();
    assert_eq!(match_entries(&a, "p2", ALL), match_entries(&b, "In Development", ALL));
    assert_ne!(match_entries(&a, "p1", ALL), match_entries(&b, "p2", ALL));
  }

  #[test]
  fn test_lookup_one_ambiguity_carries_candidates() {
    let entries = pipelines();
    let lookup: Lookup<String> = lookup_one(&entries, "n", ALL);
    match lookup {
      Lookup::Ambiguous {
        identifier,
        candidates,
      } => {
        assert_eq!(identifier, "n");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "New Issues");
        assert_eq!(candidates[1].id, "p2");
      }
      other => panic!("expected ambiguity, got {:?}", other),
    }
  }
}
