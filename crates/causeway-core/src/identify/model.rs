//! Graph-backed [`CausalModel`] implementation.

use std::collections::BTreeSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::criterion::{
    count_backdoor_paths, find_frontdoor_variable, has_directed_path, minimal_backdoor_sets,
};
use super::{CausalModel, Identifier};
use crate::config::IdentifyConfig;
use crate::error::CausewayError;
use crate::graph::CausalGraph;

/// A backdoor adjustment set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdjustmentSet {
    #[serde(rename = "backdoor_set")]
    pub variables: Vec<String>,
}

impl From<BTreeSet<String>> for AdjustmentSet {
    fn from(set: BTreeSet<String>) -> Self {
        Self {
            variables: set.into_iter().collect(),
        }
    }
}

/// State recorded by [`GraphModel::identify_effect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimand {
    pub treatment: Vec<String>,
    pub outcome: Vec<String>,
    /// Backdoor paths summed over every treatment/outcome pair.
    pub backdoor_paths: usize,
    /// Whether some treatment has a directed path to some outcome.
    pub has_directed_path: bool,
}

/// Identifier operating on a [`CausalGraph`].
#[derive(Debug, Clone)]
pub struct GraphIdentifier {
    graph: CausalGraph,
    treatment: Vec<String>,
    outcome: Vec<String>,
    config: IdentifyConfig,
    estimand: Option<Estimand>,
}

impl GraphIdentifier {
    #[must_use]
    pub const fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    #[must_use]
    pub const fn estimand(&self) -> Option<&Estimand> {
        self.estimand.as_ref()
    }

    fn require_identified(&self) -> Result<&Estimand, CausewayError> {
        self.estimand.as_ref().ok_or(CausewayError::NotIdentified)
    }

    fn validate(&self) -> Result<(), CausewayError> {
        if self.treatment.is_empty() || self.outcome.is_empty() {
            return Err(CausewayError::Unsupported(
                "treatment and outcome must each name at least one variable".to_string(),
            ));
        }
        for name in self.treatment.iter().chain(&self.outcome) {
            self.graph.require_node(name)?;
        }
        if let Some(shared) = self.treatment.iter().find(|t| self.outcome.contains(t)) {
            return Err(CausewayError::Unsupported(format!(
                "{shared} is both a treatment and an outcome"
            )));
        }
        if !self.graph.is_acyclic() {
            return Err(CausewayError::InvalidGraph("graph contains a cycle".to_string()));
        }
        Ok(())
    }

    fn build_estimand(&self) -> Result<Estimand, CausewayError> {
        let backdoor_paths = count_backdoor_paths(&self.graph, &self.treatment, &self.outcome)?;
        let mut directed = false;
        for t in &self.treatment {
            for y in &self.outcome {
                directed |= has_directed_path(&self.graph, t, y)?;
            }
        }
        Ok(Estimand {
            treatment: self.treatment.clone(),
            outcome: self.outcome.clone(),
            backdoor_paths,
            has_directed_path: directed,
        })
    }
}

impl Identifier for GraphIdentifier {
    type BackdoorSets = Vec<AdjustmentSet>;
    type FrontdoorSets = Vec<String>;

    fn treatment_name(&self) -> &[String] {
        &self.treatment
    }

    fn outcome_name(&self) -> &[String] {
        &self.outcome
    }

    fn identify_backdoor(&self, treatment: &[String], outcome: &[String]) -> Result<Vec<AdjustmentSet>> {
        self.require_identified()?;
        let sets = minimal_backdoor_sets(&self.graph, treatment, outcome, &self.config)?;
        Ok(sets.into_iter().map(AdjustmentSet::from).collect())
    }

    fn identify_frontdoor(&self) -> Result<Vec<String>> {
        self.require_identified()?;
        let ([treatment], [outcome]) = (self.treatment.as_slice(), self.outcome.as_slice()) else {
            return Err(CausewayError::Unsupported(
                "frontdoor search needs exactly one treatment and one outcome".to_string(),
            )
            .into());
        };
        Ok(find_frontdoor_variable(&self.graph, treatment, outcome)?
            .into_iter()
            .collect())
    }
}

/// A causal model over a [`CausalGraph`] with named treatment and outcome
/// variables.
#[derive(Debug, Clone)]
pub struct GraphModel {
    identifier: GraphIdentifier,
}

impl GraphModel {
    pub fn new<T, O>(graph: CausalGraph, treatment: T, outcome: O, config: IdentifyConfig) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            identifier: GraphIdentifier {
                graph,
                treatment: treatment.into_iter().map(Into::into).collect(),
                outcome: outcome.into_iter().map(Into::into).collect(),
                config,
                estimand: None,
            },
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &CausalGraph {
        self.identifier.graph()
    }

    #[must_use]
    pub const fn estimand(&self) -> Option<&Estimand> {
        self.identifier.estimand()
    }
}

impl CausalModel for GraphModel {
    type Identifier = GraphIdentifier;

    #[instrument(skip(self), fields(treatment = ?self.identifier.treatment, outcome = ?self.identifier.outcome))]
    fn identify_effect(&mut self) -> Result<()> {
        self.identifier.validate()?;
        let estimand = self.identifier.build_estimand()?;
        info!(
            backdoor_paths = estimand.backdoor_paths,
            directed = estimand.has_directed_path,
            "identified effect"
        );
        self.identifier.estimand = Some(estimand);
        Ok(())
    }

    fn identifier(&self) -> &GraphIdentifier {
        &self.identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify::{backdoor_sets, frontdoor_sets};

    fn confounded() -> CausalGraph {
        CausalGraph::from_edges(&[("Z", "T"), ("Z", "Y"), ("T", "Y")])
    }

    fn downcast(err: &anyhow::Error) -> &CausewayError {
        err.downcast_ref::<CausewayError>().expect("CausewayError")
    }

    #[test]
    fn identify_effect_records_estimand() {
        let mut model = GraphModel::new(confounded(), ["T"], ["Y"], IdentifyConfig::default());
        assert!(model.estimand().is_none());
        model.identify_effect().expect("identify");
        let estimand = model.estimand().expect("estimand");
        assert_eq!(estimand.backdoor_paths, 1);
        assert!(estimand.has_directed_path);
    }

    #[test]
    fn backdoor_sets_through_wrapper() {
        let mut model = GraphModel::new(confounded(), ["T"], ["Y"], IdentifyConfig::default());
        let sets = backdoor_sets(&mut model).expect("backdoor");
        assert_eq!(
            sets,
            vec![AdjustmentSet {
                variables: vec!["Z".to_string()]
            }]
        );
        assert!(model.estimand().is_some());
    }

    #[test]
    fn querying_before_identification_fails() {
        let model = GraphModel::new(confounded(), ["T"], ["Y"], IdentifyConfig::default());
        let id = model.identifier();
        let err = id
            .identify_backdoor(id.treatment_name(), id.outcome_name())
            .expect_err("not identified");
        assert!(matches!(downcast(&err), CausewayError::NotIdentified));
        let err = id.identify_frontdoor().expect_err("not identified");
        assert!(matches!(downcast(&err), CausewayError::NotIdentified));
    }

    #[test]
    fn frontdoor_through_wrapper() {
        let g = CausalGraph::from_edges(&[("U", "T"), ("U", "Y"), ("T", "M"), ("M", "Y")]);
        let mut model = GraphModel::new(g, ["T"], ["Y"], IdentifyConfig::default());
        assert_eq!(frontdoor_sets(&mut model).expect("frontdoor"), vec!["M".to_string()]);
    }

    #[test]
    fn frontdoor_absent_is_empty() {
        let mut model = GraphModel::new(confounded(), ["T"], ["Y"], IdentifyConfig::default());
        assert!(frontdoor_sets(&mut model).expect("frontdoor").is_empty());
    }

    #[test]
    fn frontdoor_rejects_multiple_treatments() {
        let g = CausalGraph::from_edges(&[("A", "Y"), ("B", "Y")]);
        let mut model = GraphModel::new(g, ["A", "B"], ["Y"], IdentifyConfig::default());
        let err = frontdoor_sets(&mut model).expect_err("unsupported");
        assert!(matches!(downcast(&err), CausewayError::Unsupported(_)));
        // Backdoor search handles treatment sets.
        assert_eq!(backdoor_sets(&mut model).expect("backdoor").len(), 1);
    }

    #[test]
    fn unknown_treatment_fails_identification() {
        let mut model = GraphModel::new(confounded(), ["Q"], ["Y"], IdentifyConfig::default());
        let err = backdoor_sets(&mut model).expect_err("missing node");
        assert!(matches!(downcast(&err), CausewayError::NodeNotFound(n) if n == "Q"));
        assert!(model.estimand().is_none());
    }

    #[test]
    fn cyclic_graph_fails_identification() {
        let g = CausalGraph::from_edges(&[("T", "Y"), ("Y", "T")]);
        let mut model = GraphModel::new(g, ["T"], ["Y"], IdentifyConfig::default());
        let err = model.identify_effect().expect_err("cycle");
        assert!(matches!(downcast(&err), CausewayError::InvalidGraph(_)));
    }

    #[test]
    fn overlapping_treatment_and_outcome_rejected() {
        let mut model = GraphModel::new(confounded(), ["T"], ["T"], IdentifyConfig::default());
        let err = model.identify_effect().expect_err("overlap");
        assert!(matches!(downcast(&err), CausewayError::Unsupported(_)));
    }

    #[test]
    fn adjustment_set_serializes_like_backdoor_set() {
        let set = AdjustmentSet::from(BTreeSet::from(["W".to_string(), "Z".to_string()]));
        let json = serde_json::to_value(&set).expect("serialize");
        assert_eq!(json, serde_json::json!({"backdoor_set": ["W", "Z"]}));
    }
}
