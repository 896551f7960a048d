/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Rule sets compiled to a binary decision diagram.
//!
//! Each node tests one condition and branches to its high (condition held) or low edge. Edges
//! reference another node, a terminal, or a result:
//!
//! * `1` and `-1` are the true and false terminals. Both mean no rule matched.
//! * References of at least `100_000_000` select a result. Result `0` is the implicit
//!   no-match result, result `n` is the `n`th entry of [`EndpointBdd::results`] (1-based).
//! * Any other reference `r` points at node `|r| - 1`. A negative reference is a complement
//!   edge and swaps the node's branches. Node `0` is therefore only a placeholder for the
//!   terminal and is never evaluated.

use crate::endpoint::Endpoint;
use crate::error::{EvaluationError, RulesetError};
use crate::evaluator::evaluate_rule;
use crate::expr::EvalContext;
use crate::parameters::Parameters;
use crate::rule::{Condition, Rule, RuleKind};
use crate::scope::Scope;

const RESULT_OFFSET: i32 = 100_000_000;

/// A decision node: the condition to test and where to go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BddNode {
    condition: usize,
    high: i32,
    low: i32,
}

impl BddNode {
    /// A node testing `conditions[condition]`.
    pub fn new(condition: usize, high: i32, low: i32) -> Self {
        Self {
            condition,
            high,
            low,
        }
    }

    /// Index of the condition this node tests
    pub fn condition(&self) -> usize {
        self.condition
    }

    /// Reference followed when the condition holds
    pub fn high(&self) -> i32 {
        self.high
    }

    /// Reference followed when it does not
    pub fn low(&self) -> i32 {
        self.low
    }
}

enum Target {
    NoMatch,
    Result(usize),
    Node { index: usize, complement: bool },
}

fn target(reference: i32) -> Option<Target> {
    match reference {
        0 => None,
        1 | -1 | RESULT_OFFSET => Some(Target::NoMatch),
        r if r > RESULT_OFFSET => Some(Target::Result((r - RESULT_OFFSET) as usize - 1)),
        r => Some(Target::Node {
            index: r.unsigned_abs() as usize - 1,
            complement: r < 0,
        }),
    }
}

/// A rule set in BDD form.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointBdd {
    parameters: Parameters,
    conditions: Vec<Condition>,
    results: Vec<Rule>,
    nodes: Vec<BddNode>,
    root: i32,
}

impl EndpointBdd {
    /// Creates a BDD, checking that every reference is in range.
    ///
    /// Results must be endpoint or error rules without conditions.
    pub fn new(
        parameters: Parameters,
        conditions: Vec<Condition>,
        results: Vec<Rule>,
        nodes: Vec<BddNode>,
        root: i32,
    ) -> Result<Self, RulesetError> {
        for (index, result) in results.iter().enumerate() {
            if !result.conditions().is_empty() || matches!(result.kind(), RuleKind::Tree(_)) {
                return Err(RulesetError::Invalid(format!(
                    "BDD result {} must be an endpoint or error rule without conditions",
                    index + 1
                )));
            }
        }
        let bdd = Self {
            parameters,
            conditions,
            results,
            nodes,
            root,
        };
        bdd.check_reference(root)?;
        // Node 0 stands in for the terminal and is never visited.
        for node in bdd.nodes.iter().skip(1) {
            if node.condition >= bdd.conditions.len() {
                return Err(RulesetError::Invalid(format!(
                    "BDD node references missing condition {}",
                    node.condition
                )));
            }
            bdd.check_reference(node.high)?;
            bdd.check_reference(node.low)?;
        }
        Ok(bdd)
    }

    fn check_reference(&self, reference: i32) -> Result<(), RulesetError> {
        let valid = match target(reference) {
            None => false,
            Some(Target::NoMatch) => true,
            Some(Target::Result(index)) => index < self.results.len(),
            Some(Target::Node { index, .. }) => index < self.nodes.len(),
        };
        if valid {
            Ok(())
        } else {
            Err(RulesetError::Invalid(format!(
                "BDD reference {reference} is out of range"
            )))
        }
    }

    /// Parses a BDD document: `parameters`, `conditions`, `results`, `root` and `nodes` as
    /// `[condition, high, low]` triples.
    pub fn from_json(document: &str) -> Result<Self, RulesetError> {
        crate::json::parse_bdd(document)
    }

    /// Parameter declarations
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Conditions referenced by nodes
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Results, excluding the implicit no-match result
    pub fn results(&self) -> &[Rule] {
        &self.results
    }

    /// Decision nodes
    pub fn nodes(&self) -> &[BddNode] {
        &self.nodes
    }

    /// Reference evaluation starts from
    pub fn root(&self) -> i32 {
        self.root
    }

    /// Walks the diagram from the root. Conditions bind into `scope` as they are tested.
    pub(crate) fn evaluate(
        &self,
        scope: &mut Scope<'_>,
        ctx: &mut EvalContext<'_>,
    ) -> Result<Option<Endpoint>, EvaluationError> {
        let mut reference = self.root;
        // Every path through an acyclic diagram visits each node at most once.
        for _ in 0..=self.nodes.len() {
            match target(reference) {
                None => break,
                Some(Target::NoMatch) => return Ok(None),
                Some(Target::Result(index)) => {
                    let rule = &self.results[index];
                    tracing::trace!(result = index + 1, "BDD reached result");
                    return evaluate_rule(rule, scope, ctx);
                }
                Some(Target::Node { index, complement }) => {
                    let node = &self.nodes[index];
                    let condition = &self.conditions[node.condition];
                    let satisfied = condition.eval(scope, ctx)?;
                    tracing::trace!(condition = %condition, satisfied, "BDD condition");
                    reference = if complement ^ satisfied {
                        node.high
                    } else {
                        node.low
                    };
                }
            }
        }
        Err(EvaluationError::InvalidArgument(format!(
            "BDD reference {reference} does not terminate"
        )))
    }
}

#[cfg(test)]
mod test {
    use super::{BddNode, EndpointBdd, RESULT_OFFSET};
    use crate::error::EvaluationError;
    use crate::evaluator::RuleEvaluator;
    use crate::expr::Expr;
    use crate::function::{FnNode, Function};
    use crate::identifier::Identifier;
    use crate::parameters::{Parameter, ParameterType, Parameters};
    use crate::rule::{Condition, EndpointResult, Rule};
    use crate::value::Value;
    use std::collections::HashMap;

    fn parameters() -> Parameters {
        [
            Parameter::builder("Region", ParameterType::String)
                .build()
                .unwrap(),
            Parameter::builder("UseFIPS", ParameterType::Boolean)
                .required(true)
                .default_value(false)
                .build()
                .unwrap(),
        ]
        .into_iter()
        .collect()
    }

    fn conditions() -> Vec<Condition> {
        vec![
            Condition::new(FnNode::new(Function::IsSet, vec![Expr::reference("Region")]).unwrap()),
            Condition::new(
                FnNode::new(
                    Function::BooleanEquals,
                    vec![Expr::reference("UseFIPS"), true.into()],
                )
                .unwrap(),
            ),
        ]
    }

    fn results() -> Vec<Rule> {
        vec![
            Rule::endpoint(
                vec![],
                EndpointResult::builder()
                    .url(Expr::string("https://svc-fips.{Region}.amazonaws.com").unwrap())
                    .build()
                    .unwrap(),
            ),
            Rule::endpoint(
                vec![],
                EndpointResult::builder()
                    .url(Expr::string("https://svc.{Region}.amazonaws.com").unwrap())
                    .build()
                    .unwrap(),
            ),
            Rule::error(vec![], Expr::string("Region must be set").unwrap()),
        ]
    }

    // isSet(Region) ? (UseFIPS ? fips : standard) : error
    fn bdd(root: i32, nodes: Vec<BddNode>) -> EndpointBdd {
        EndpointBdd::new(parameters(), conditions(), results(), nodes, root).unwrap()
    }

    fn standard() -> EndpointBdd {
        bdd(
            2,
            vec![
                BddNode::new(0, -1, -1),
                BddNode::new(0, 3, RESULT_OFFSET + 3),
                BddNode::new(1, RESULT_OFFSET + 1, RESULT_OFFSET + 2),
            ],
        )
    }

    fn params(values: &[(&'static str, Value)]) -> HashMap<Identifier, Value> {
        values
            .iter()
            .map(|(name, value)| (Identifier::from(*name), value.clone()))
            .collect()
    }

    fn resolve(bdd: &EndpointBdd, values: &[(&'static str, Value)]) -> Result<Value, EvaluationError> {
        RuleEvaluator::new().evaluate_bdd(bdd, &params(values))
    }

    #[test]
    fn walks_to_results() {
        let bdd = standard();
        let fips = resolve(&bdd, &[("Region", "us-east-1".into()), ("UseFIPS", true.into())]);
        assert_eq!(
            fips.unwrap().expect_endpoint().unwrap().url(),
            "https://svc-fips.us-east-1.amazonaws.com"
        );
        let standard = resolve(&bdd, &[("Region", "us-east-1".into())]);
        assert_eq!(
            standard.unwrap().expect_endpoint().unwrap().url(),
            "https://svc.us-east-1.amazonaws.com"
        );
        let err = resolve(&bdd, &[]).unwrap_err();
        assert_eq!(err.rule_message(), Some("Region must be set"));
    }

    #[test]
    fn complement_edges_swap_branches() {
        // !isSet(Region) ? error : standard
        let bdd = bdd(
            -2,
            vec![
                BddNode::new(0, -1, -1),
                BddNode::new(0, RESULT_OFFSET + 3, RESULT_OFFSET + 2),
            ],
        );
        let standard = resolve(&bdd, &[("Region", "us-east-1".into())]).unwrap();
        assert_eq!(
            standard.expect_endpoint().unwrap().url(),
            "https://svc.us-east-1.amazonaws.com"
        );
        let err = resolve(&bdd, &[]).unwrap_err();
        assert_eq!(err.rule_message(), Some("Region must be set"));
    }

    #[test]
    fn terminals_and_result_zero_are_no_match() {
        for root in [1, -1, RESULT_OFFSET] {
            let err = resolve(&bdd(root, vec![]), &[]).unwrap_err();
            assert!(matches!(err, EvaluationError::NoMatch), "{root}");
        }
    }

    #[test]
    fn out_of_range_references_are_rejected() {
        for root in [0, 5, -5, RESULT_OFFSET + 4] {
            assert!(
                EndpointBdd::new(parameters(), conditions(), results(), vec![], root).is_err(),
                "{root}"
            );
        }
        assert!(EndpointBdd::new(
            parameters(),
            conditions(),
            results(),
            vec![BddNode::new(0, 1, -1), BddNode::new(7, 1, -1)],
            2
        )
        .is_err());
    }

    #[test]
    fn results_must_be_endpoint_or_error_rules() {
        let results = vec![Rule::tree(vec![], vec![])];
        assert!(EndpointBdd::new(parameters(), conditions(), results, vec![], 1).is_err());
    }

    #[test]
    fn cycles_are_reported() {
        let bdd = bdd(2, vec![BddNode::new(0, -1, -1), BddNode::new(0, 2, 2)]);
        let err = resolve(&bdd, &[]).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidArgument(_)));
    }

    #[test]
    fn required_parameters_are_checked_before_walking() {
        let bdd = standard();
        let err = resolve(&bdd, &[("UseFIPS", "yes".into())]).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidParameter { .. }));
    }
}
