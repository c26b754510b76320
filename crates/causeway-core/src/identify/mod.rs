//! Effect identification: model capabilities and adjustment-set queries.
//!
//! # Overview
//!
//! A [`CausalModel`] owns an [`Identifier`] whose state is populated by
//! [`CausalModel::identify_effect`]. The two wrappers here run that step and
//! then ask the identifier for backdoor or frontdoor adjustment sets,
//! returning whatever the identifier produces.
//!
//! Errors from the model are returned unchanged.
//!
//! ## Built-in model
//!
//! [`GraphModel`] identifies effects directly on a [`crate::graph::CausalGraph`]
//! using path blocking (see [`criterion`]). Any other type implementing the two
//! traits can be passed to [`backdoor_sets`] and [`frontdoor_sets`] instead.

use anyhow::Result;
use tracing::instrument;

pub mod criterion;
pub mod model;

pub use criterion::{is_blocked, satisfies_backdoor};
pub use model::{AdjustmentSet, Estimand, GraphIdentifier, GraphModel};

/// A causal model that can identify the effect of its treatment on its outcome.
pub trait CausalModel {
    type Identifier: Identifier;

    /// Run effect identification, populating the identifier's state.
    fn identify_effect(&mut self) -> Result<()>;

    fn identifier(&self) -> &Self::Identifier;
}

/// Computes adjustment sets for a model's treatment and outcome.
pub trait Identifier {
    type BackdoorSets;
    type FrontdoorSets;

    fn treatment_name(&self) -> &[String];

    fn outcome_name(&self) -> &[String];

    fn identify_backdoor(&self, treatment: &[String], outcome: &[String])
    -> Result<Self::BackdoorSets>;

    fn identify_frontdoor(&self) -> Result<Self::FrontdoorSets>;
}

/// Backdoor adjustment sets for the model's treatment and outcome.
///
/// Calls [`CausalModel::identify_effect`] first, mutating the model.
///
/// # Errors
///
/// Propagates any error from the model or its identifier.
#[instrument(skip_all)]
pub fn backdoor_sets<M: CausalModel>(
    model: &mut M,
) -> Result<<M::Identifier as Identifier>::BackdoorSets> {
    model.identify_effect()?;
    let identifier = model.identifier();
    identifier.identify_backdoor(identifier.treatment_name(), identifier.outcome_name())
}

/// Frontdoor adjustment sets for the model's treatment and outcome.
///
/// Calls [`CausalModel::identify_effect`] first, mutating the model.
///
/// # Errors
///
/// Propagates any error from the model or its identifier.
#[instrument(skip_all)]
pub fn frontdoor_sets<M: CausalModel>(
    model: &mut M,
) -> Result<<M::Identifier as Identifier>::FrontdoorSets> {
    model.identify_effect()?;
    model.identifier().identify_frontdoor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records the calls it receives.
    #[derive(Default)]
    struct Recording {
        treatment: Vec<String>,
        outcome: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    impl Identifier for Recording {
        type BackdoorSets = Vec<String>;
        type FrontdoorSets = &'static str;

        fn treatment_name(&self) -> &[String] {
            &self.treatment
        }

        fn outcome_name(&self) -> &[String] {
            &self.outcome
        }

        fn identify_backdoor(&self, treatment: &[String], outcome: &[String]) -> Result<Vec<String>> {
            self.calls.borrow_mut().push("backdoor".into());
            Ok(treatment.iter().chain(outcome).cloned().collect())
        }

        fn identify_frontdoor(&self) -> Result<&'static str> {
            self.calls.borrow_mut().push("frontdoor".into());
            Ok("mediator")
        }
    }

    struct StubModel {
        identified: usize,
        fail: bool,
        identifier: Recording,
    }

    impl StubModel {
        fn new(fail: bool) -> Self {
            Self {
                identified: 0,
                fail,
                identifier: Recording {
                    treatment: vec!["T".into()],
                    outcome: vec!["Y".into()],
                    ..Recording::default()
                },
            }
        }
    }

    impl CausalModel for StubModel {
        type Identifier = Recording;

        fn identify_effect(&mut self) -> Result<()> {
            if self.fail {
                anyhow::bail!("model exploded");
            }
            self.identified += 1;
            Ok(())
        }

        fn identifier(&self) -> &Recording {
            &self.identifier
        }
    }

    #[test]
    fn backdoor_wrapper_identifies_then_forwards_names() {
        let mut model = StubModel::new(false);
        let sets = backdoor_sets(&mut model).expect("backdoor");
        assert_eq!(sets, vec!["T".to_string(), "Y".to_string()]);
        assert_eq!(model.identified, 1);
        assert_eq!(*model.identifier.calls.borrow(), vec!["backdoor".to_string()]);
    }

    #[test]
    fn frontdoor_wrapper_returns_identifier_value() {
        let mut model = StubModel::new(false);
        assert_eq!(frontdoor_sets(&mut model).expect("frontdoor"), "mediator");
        assert_eq!(model.identified, 1);
    }

    #[test]
    fn model_errors_propagate_unchanged() {
        let mut model = StubModel::new(true);
        let err = backdoor_sets(&mut model).expect_err("should fail");
        assert_eq!(err.to_string(), "model exploded");
        assert!(model.identifier.calls.borrow().is_empty());

        let err = frontdoor_sets(&mut model).expect_err("should fail");
        assert_eq!(err.to_string(), "model exploded");
    }
}
