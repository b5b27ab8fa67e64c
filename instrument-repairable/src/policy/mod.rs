//! Defect-class policy.
//!
//! Turns a [`DefectClassConfig`] into the ordered list of node-selection
//! predicates that the engine evaluates on every node.

mod predicates;

pub use self::predicates::{is_repairable_expression, references_variable, MatchContext};

use tree_sitter::Node;

use crate::config::DefectClassConfig;

/// Syntactic category of a repairable node; decides the wrapper shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Value-producing position, wrapped as a statement expression.
    Expression,
    /// Statement position, wrapped as a compound statement.
    Statement,
}

/// Operating mode of the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    /// Conditions and integer assignments only; defect classes are ignored.
    Semfix,
    /// One predicate per enabled defect class.
    DefectClass,
}

/// A named node-selection predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Repairable condition of any `if` or loop (semfix).
    InterestingCondition,
    /// Repairable value stored to an integer object (semfix).
    InterestingIntegerAssignment,
    /// Repairable `if` condition.
    RepairableIfCondition,
    /// Repairable `if` condition that reads at least one variable.
    NonTrivialRepairableIfCondition,
    /// Repairable `while`, `do` or `for` condition.
    RepairableLoopCondition,
    /// Repairable loop condition that reads at least one variable.
    NonTrivialRepairableLoopCondition,
    /// Repairable right-hand side of an assignment or initializer.
    RepairableAssignment,
    /// Repairable assigned value that reads at least one variable.
    NonTrivialRepairableAssignment,
    /// Guardable statement inside a block.
    InterestingStatement,
}

impl Predicate {
    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InterestingCondition => "interesting-condition",
            Self::InterestingIntegerAssignment => "interesting-integer-assignment",
            Self::RepairableIfCondition => "repairable-if-condition",
            Self::NonTrivialRepairableIfCondition => "non-trivial-repairable-if-condition",
            Self::RepairableLoopCondition => "repairable-loop-condition",
            Self::NonTrivialRepairableLoopCondition => "non-trivial-repairable-loop-condition",
            Self::RepairableAssignment => "repairable-assignment",
            Self::NonTrivialRepairableAssignment => "non-trivial-repairable-assignment",
            Self::InterestingStatement => "interesting-statement",
        }
    }

    /// Handler category for nodes selected by this predicate.
    #[must_use]
    pub const fn category(self) -> NodeCategory {
        match self {
            Self::InterestingStatement => NodeCategory::Statement,
            _ => NodeCategory::Expression,
        }
    }
}

/// Active predicates, in evaluation order, and the mode that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    mode: PolicyMode,
    predicates: Vec<Predicate>,
}

impl Policy {
    /// Build the policy for a configuration.
    ///
    /// Semfix mode wins over every defect-class switch. Otherwise each
    /// enabled expression class contributes its plain or non-trivial
    /// predicate (per `ignore_trivial`), followed by the statement predicate
    /// when guards are enabled.
    #[must_use]
    pub fn from_config(config: &DefectClassConfig) -> Self {
        if config.semfix_mode {
            return Self {
                mode: PolicyMode::Semfix,
                predicates: vec![
                    Predicate::InterestingCondition,
                    Predicate::InterestingIntegerAssignment,
                ],
            };
        }

        let mut predicates = Vec::new();
        let classes = [
            (
                config.if_conditions,
                Predicate::RepairableIfCondition,
                Predicate::NonTrivialRepairableIfCondition,
            ),
            (
                config.loop_conditions,
                Predicate::RepairableLoopCondition,
                Predicate::NonTrivialRepairableLoopCondition,
            ),
            (
                config.assignments,
                Predicate::RepairableAssignment,
                Predicate::NonTrivialRepairableAssignment,
            ),
        ];
        for (enabled, plain, non_trivial) in classes {
            if enabled {
                predicates.push(if config.ignore_trivial {
                    non_trivial
                } else {
                    plain
                });
            }
        }
        if config.guards {
            predicates.push(Predicate::InterestingStatement);
        }

        Self {
            mode: PolicyMode::DefectClass,
            predicates,
        }
    }

    /// The mode this policy runs in.
    #[must_use]
    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Active predicates in evaluation order.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether no predicate is active (the file passes through untouched).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// First active predicate selecting `node`, if any.
    #[must_use]
    pub fn first_match(&self, node: Node<'_>, cx: &MatchContext<'_>) -> Option<Predicate> {
        self.predicates
            .iter()
            .copied()
            .find(|predicate| predicate.matches(node, cx))
    }
}
