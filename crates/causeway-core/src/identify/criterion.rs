//! Path blocking and the backdoor / frontdoor criteria.
//!
//! # Blocking
//!
//! A path is blocked by a conditioning set `Z` when
//!
//! - some interior non-collider is in `Z`, or
//! - some collider has neither itself nor any descendant in `Z`.
//!
//! # Backdoor criterion
//!
//! `Z` satisfies the backdoor criterion for `(T, Y)` when no member of `Z` is
//! a treatment, an outcome or a descendant of a treatment, and `Z` blocks
//! every backdoor path from each treatment to each outcome. Paths passing
//! through another treatment or outcome node are not considered.
//!
//! # Frontdoor criterion (single variable)
//!
//! `M` satisfies the frontdoor criterion for `(t, y)` when
//!
//! 1. `M` is on a directed path `t → … → y` and every such path passes
//!    through `M`,
//! 2. every backdoor path from `t` to `M` is blocked by `∅`,
//! 3. every backdoor path from `M` to `y` is blocked by `{t}`.

use std::collections::{BTreeSet, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use crate::adjust::is_collider;
use crate::config::IdentifyConfig;
use crate::error::CausewayError;
use crate::graph::{CausalGraph, IncomingEdgeBackdoor, find_backdoor_paths};

// ---------------------------------------------------------------------------
// Blocking
// ---------------------------------------------------------------------------

/// Precomputed blocking structure of one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSummary {
    non_colliders: Vec<String>,
    /// One entry per collider: the collider and all of its descendants.
    collider_closures: Vec<Vec<String>>,
}

impl PathSummary {
    #[must_use]
    pub fn new(graph: &CausalGraph, path: &[String]) -> Self {
        let mut non_colliders = Vec::new();
        let mut collider_closures = Vec::new();
        for w in path.windows(3) {
            if is_collider(graph, &w[0], &w[1], &w[2]) {
                let mut closure = graph.descendants(&w[1]).unwrap_or_default();
                closure.push(w[1].clone());
                collider_closures.push(closure);
            } else {
                non_colliders.push(w[1].clone());
            }
        }
        Self {
            non_colliders,
            collider_closures,
        }
    }

    #[must_use]
    pub fn is_blocked_by(&self, conditioned: &BTreeSet<String>) -> bool {
        self.non_colliders.iter().any(|n| conditioned.contains(n))
            || self
                .collider_closures
                .iter()
                .any(|closure| !closure.iter().any(|n| conditioned.contains(n)))
    }
}

/// True when `conditioned` blocks `path` in `graph`.
#[must_use]
pub fn is_blocked(graph: &CausalGraph, path: &[String], conditioned: &BTreeSet<String>) -> bool {
    PathSummary::new(graph, path).is_blocked_by(conditioned)
}

fn backdoor_summaries(
    graph: &CausalGraph,
    source: &str,
    target: &str,
) -> Result<Vec<PathSummary>, CausewayError> {
    Ok(find_backdoor_paths(graph, source, target, &IncomingEdgeBackdoor)?
        .iter()
        .map(|path| PathSummary::new(graph, path))
        .collect())
}

// ---------------------------------------------------------------------------
// Backdoor
// ---------------------------------------------------------------------------

fn descendants_of_all(
    graph: &CausalGraph,
    nodes: &[String],
) -> Result<HashSet<String>, CausewayError> {
    let mut out = HashSet::new();
    for node in nodes {
        out.extend(graph.descendants(node)?);
    }
    Ok(out)
}

/// Backdoor paths between every treatment/outcome pair whose interior avoids
/// all treatment and outcome nodes.
fn all_backdoor_summaries(
    graph: &CausalGraph,
    treatment: &[String],
    outcome: &[String],
) -> Result<Vec<PathSummary>, CausewayError> {
    let endpoints: HashSet<&str> = treatment
        .iter()
        .chain(outcome)
        .map(String::as_str)
        .collect();
    let mut summaries = Vec::new();
    for t in treatment {
        for y in outcome {
            summaries.extend(
                find_backdoor_paths(graph, t, y, &IncomingEdgeBackdoor)?
                    .iter()
                    .filter(|path| {
                        let interior = &path[1..path.len().saturating_sub(1)];
                        !interior.iter().any(|n| endpoints.contains(n.as_str()))
                    })
                    .map(|path| PathSummary::new(graph, path)),
            );
        }
    }
    Ok(summaries)
}

/// True when `conditioned` satisfies the backdoor criterion for
/// `(treatment, outcome)`.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if any treatment or outcome is missing.
pub fn satisfies_backdoor(
    graph: &CausalGraph,
    treatment: &[String],
    outcome: &[String],
    conditioned: &BTreeSet<String>,
) -> Result<bool, CausewayError> {
    let forbidden = descendants_of_all(graph, treatment)?;
    if conditioned
        .iter()
        .any(|z| forbidden.contains(z) || treatment.contains(z) || outcome.contains(z))
    {
        return Ok(false);
    }
    let summaries = all_backdoor_summaries(graph, treatment, outcome)?;
    Ok(summaries.iter().all(|s| s.is_blocked_by(conditioned)))
}

/// Number of backdoor paths between every treatment/outcome pair.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if any treatment or outcome is missing.
pub fn count_backdoor_paths(
    graph: &CausalGraph,
    treatment: &[String],
    outcome: &[String],
) -> Result<usize, CausewayError> {
    let mut total = 0;
    for t in treatment {
        for y in outcome {
            total += find_backdoor_paths(graph, t, y, &IncomingEdgeBackdoor)?.len();
        }
    }
    Ok(total)
}

/// Minimal backdoor adjustment sets, smallest first.
///
/// Candidates are every variable that is not a treatment, an outcome or a
/// descendant of a treatment. Sets are tried by increasing size and then in
/// name order; supersets of an accepted set are skipped. The search stops
/// after `config.max_backdoor_sets` results or at sets larger than
/// `config.max_backdoor_set_size`.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if any treatment or outcome is missing.
pub fn minimal_backdoor_sets(
    graph: &CausalGraph,
    treatment: &[String],
    outcome: &[String],
    config: &IdentifyConfig,
) -> Result<Vec<BTreeSet<String>>, CausewayError> {
    let forbidden = descendants_of_all(graph, treatment)?;
    let candidates: Vec<String> = graph
        .names()
        .into_iter()
        .filter(|n| !forbidden.contains(n) && !treatment.contains(n) && !outcome.contains(n))
        .collect();
    let summaries = all_backdoor_summaries(graph, treatment, outcome)?;
    debug!(
        candidates = candidates.len(),
        backdoor_paths = summaries.len(),
        "searching backdoor sets"
    );

    let mut found: Vec<BTreeSet<String>> = Vec::new();
    let max_size = config.max_backdoor_set_size.min(candidates.len());
    for size in 0..=max_size {
        for combo in Combinations::new(candidates.len(), size) {
            if found.len() >= config.max_backdoor_sets {
                return Ok(found);
            }
            let set: BTreeSet<String> = combo.iter().map(|&i| candidates[i].clone()).collect();
            if found.iter().any(|f| f.is_subset(&set)) {
                continue;
            }
            if summaries.iter().all(|s| s.is_blocked_by(&set)) {
                trace!(?set, "accepted backdoor set");
                found.push(set);
            }
        }
    }
    Ok(found)
}

/// Lexicographic `k`-combinations of `0..n`.
struct Combinations {
    n: usize,
    idx: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            idx: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.idx.clone();

        let k = self.idx.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.idx[i] < self.n - k + i {
                self.idx[i] += 1;
                for j in i + 1..k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Frontdoor
// ---------------------------------------------------------------------------

/// BFS along directed edges from `from` to `to`, never entering `avoid`.
fn directed_path_exists(
    graph: &CausalGraph,
    from: NodeIndex,
    to: NodeIndex,
    avoid: Option<NodeIndex>,
) -> bool {
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([from]);
    let mut visited: HashSet<NodeIndex> = HashSet::from([from]);

    while let Some(current) = queue.pop_front() {
        if current == to {
            return true;
        }
        for next in graph.graph.neighbors(current) {
            if Some(next) != avoid && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// True when `treatment` has a directed path to `outcome`.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if either node is missing.
pub fn has_directed_path(
    graph: &CausalGraph,
    treatment: &str,
    outcome: &str,
) -> Result<bool, CausewayError> {
    let t = graph.require_node(treatment)?;
    let y = graph.require_node(outcome)?;
    Ok(directed_path_exists(graph, t, y, None))
}

/// True when `mediator` satisfies the single-variable frontdoor criterion.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if any node is missing.
pub fn satisfies_frontdoor(
    graph: &CausalGraph,
    treatment: &str,
    outcome: &str,
    mediator: &str,
) -> Result<bool, CausewayError> {
    let t = graph.require_node(treatment)?;
    let y = graph.require_node(outcome)?;
    let m = graph.require_node(mediator)?;
    if m == t || m == y {
        return Ok(false);
    }

    let intercepts = directed_path_exists(graph, t, m, None)
        && directed_path_exists(graph, m, y, None)
        && !directed_path_exists(graph, t, y, Some(m));
    if !intercepts {
        return Ok(false);
    }

    let unconditioned = BTreeSet::new();
    if !backdoor_summaries(graph, treatment, mediator)?
        .iter()
        .all(|s| s.is_blocked_by(&unconditioned))
    {
        return Ok(false);
    }

    let by_treatment = BTreeSet::from([treatment.to_string()]);
    Ok(backdoor_summaries(graph, mediator, outcome)?
        .iter()
        .all(|s| s.is_blocked_by(&by_treatment)))
}

/// First variable, in name order, satisfying the frontdoor criterion.
///
/// # Errors
///
/// Returns [`CausewayError::NodeNotFound`] if either node is missing.
pub fn find_frontdoor_variable(
    graph: &CausalGraph,
    treatment: &str,
    outcome: &str,
) -> Result<Option<String>, CausewayError> {
    for candidate in graph.names() {
        if candidate == treatment || candidate == outcome {
            continue;
        }
        if satisfies_frontdoor(graph, treatment, outcome, &candidate)? {
            debug!(mediator = %candidate, "found frontdoor variable");
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn combinations_are_lexicographic() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(3, 0).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
    }

    #[test]
    fn chain_blocked_by_middle_node() {
        let g = CausalGraph::from_edges(&[("A", "B"), ("B", "C")]);
        let p = names(&["A", "B", "C"]);
        assert!(!is_blocked(&g, &p, &set(&[])));
        assert!(is_blocked(&g, &p, &set(&["B"])));
    }

    #[test]
    fn collider_opened_by_descendant() {
        let g = CausalGraph::from_edges(&[("A", "B"), ("C", "B"), ("B", "D")]);
        let p = names(&["A", "B", "C"]);
        assert!(is_blocked(&g, &p, &set(&[])));
        assert!(!is_blocked(&g, &p, &set(&["B"])));
        assert!(!is_blocked(&g, &p, &set(&["D"])));
    }

    #[test]
    fn confounder_is_minimal_backdoor_set() {
        let g = CausalGraph::from_edges(&[("Z", "T"), ("Z", "Y"), ("T", "Y")]);
        let sets =
            minimal_backdoor_sets(&g, &names(&["T"]), &names(&["Y"]), &IdentifyConfig::default())
                .expect("sets");
        assert_eq!(sets, vec![set(&["Z"])]);
        assert!(satisfies_backdoor(&g, &names(&["T"]), &names(&["Y"]), &set(&["Z"])).expect("ok"));
        assert!(!satisfies_backdoor(&g, &names(&["T"]), &names(&["Y"]), &set(&[])).expect("ok"));
    }

    #[test]
    fn no_confounding_gives_empty_set() {
        let g = CausalGraph::from_edges(&[("T", "M"), ("M", "Y"), ("W", "Y")]);
        let sets =
            minimal_backdoor_sets(&g, &names(&["T"]), &names(&["Y"]), &IdentifyConfig::default())
                .expect("sets");
        assert_eq!(sets, vec![set(&[])]);
    }

    #[test]
    fn mediators_are_never_candidates() {
        let g = CausalGraph::from_edges(&[("T", "M"), ("M", "Y"), ("Z", "T"), ("Z", "Y")]);
        assert!(!satisfies_backdoor(&g, &names(&["T"]), &names(&["Y"]), &set(&["Z", "M"])).expect("ok"));
    }

    #[test]
    fn collider_bias_is_avoided() {
        // M-bias: T ← A → C ← B → Y. C is a collider; {} is valid, {C} is not.
        let g = CausalGraph::from_edges(&[
            ("A", "T"),
            ("A", "C"),
            ("B", "C"),
            ("B", "Y"),
            ("T", "Y"),
        ]);
        let t = names(&["T"]);
        let y = names(&["Y"]);
        assert!(satisfies_backdoor(&g, &t, &y, &set(&[])).expect("ok"));
        assert!(!satisfies_backdoor(&g, &t, &y, &set(&["C"])).expect("ok"));
        assert!(satisfies_backdoor(&g, &t, &y, &set(&["C", "A"])).expect("ok"));
        let sets = minimal_backdoor_sets(&g, &t, &y, &IdentifyConfig::default()).expect("sets");
        assert_eq!(sets, vec![set(&[])]);
    }

    #[test]
    fn paths_through_other_treatments_are_ignored() {
        // B → A, B → Y, A → Y. The only backdoor path from A runs through B.
        let g = CausalGraph::from_edges(&[("B", "A"), ("B", "Y"), ("A", "Y")]);
        let t = names(&["A", "B"]);
        let y = names(&["Y"]);
        assert!(satisfies_backdoor(&g, &t, &y, &set(&[])).expect("ok"));
        let sets = minimal_backdoor_sets(&g, &t, &y, &IdentifyConfig::default()).expect("sets");
        assert_eq!(sets, vec![set(&[])]);
    }

    #[test]
    fn treatment_sets_still_need_shared_confounders() {
        // Z confounds A and Y; B is a second treatment on its own branch.
        let g = CausalGraph::from_edges(&[("Z", "A"), ("Z", "Y"), ("A", "Y"), ("B", "Y")]);
        let t = names(&["A", "B"]);
        let y = names(&["Y"]);
        assert!(!satisfies_backdoor(&g, &t, &y, &set(&[])).expect("ok"));
        let sets = minimal_backdoor_sets(&g, &t, &y, &IdentifyConfig::default()).expect("sets");
        assert_eq!(sets, vec![set(&["Z"])]);
    }

    #[test]
    fn search_respects_limits() {
        // Two independent confounders, each with a proxy: Zi → Pi → T, Zi → Y.
        let g = CausalGraph::from_edges(&[
            ("Z1", "P1"),
            ("P1", "T"),
            ("Z1", "Y"),
            ("Z2", "P2"),
            ("P2", "T"),
            ("Z2", "Y"),
            ("T", "Y"),
        ]);
        let t = names(&["T"]);
        let y = names(&["Y"]);
        let all = minimal_backdoor_sets(&g, &t, &y, &IdentifyConfig::default()).expect("sets");
        assert_eq!(
            all,
            vec![set(&["P1", "P2"]), set(&["P1", "Z2"]), set(&["P2", "Z1"]), set(&["Z1", "Z2"])]
        );

        let capped = IdentifyConfig {
            max_backdoor_set_size: 4,
            max_backdoor_sets: 1,
        };
        assert_eq!(minimal_backdoor_sets(&g, &t, &y, &capped).expect("sets").len(), 1);

        let too_small = IdentifyConfig {
            max_backdoor_set_size: 1,
            max_backdoor_sets: 16,
        };
        assert!(minimal_backdoor_sets(&g, &t, &y, &too_small).expect("sets").is_empty());
    }

    #[test]
    fn frontdoor_mediator_found() {
        let g = CausalGraph::from_edges(&[("U", "T"), ("U", "Y"), ("T", "M"), ("M", "Y")]);
        assert!(satisfies_frontdoor(&g, "T", "Y", "M").expect("ok"));
        assert!(!satisfies_frontdoor(&g, "T", "Y", "U").expect("ok"));
        assert_eq!(find_frontdoor_variable(&g, "T", "Y").expect("ok"), Some("M".to_string()));
    }

    #[test]
    fn frontdoor_requires_full_interception() {
        let g = CausalGraph::from_edges(&[("U", "T"), ("U", "Y"), ("T", "M"), ("M", "Y"), ("T", "Y")]);
        assert!(!satisfies_frontdoor(&g, "T", "Y", "M").expect("ok"));
        assert_eq!(find_frontdoor_variable(&g, "T", "Y").expect("ok"), None);
    }

    #[test]
    fn frontdoor_rejects_confounded_mediator() {
        let g = CausalGraph::from_edges(&[
            ("U", "T"),
            ("U", "Y"),
            ("T", "M"),
            ("M", "Y"),
            ("V", "M"),
            ("V", "Y"),
        ]);
        assert!(!satisfies_frontdoor(&g, "T", "Y", "M").expect("ok"));
    }

    #[test]
    fn directed_path_check() {
        let g = CausalGraph::from_edges(&[("T", "M"), ("M", "Y"), ("Z", "T")]);
        assert!(has_directed_path(&g, "T", "Y").expect("ok"));
        assert!(!has_directed_path(&g, "Y", "T").expect("ok"));
        assert!(has_directed_path(&g, "Q", "T").is_err());
    }
}
