use std::fmt;

use crate::types::{to_var, Assignment, Clause, Formula, Var};

/// Outcome of checking a candidate assignment against a formula.
///
/// Failures name their cause so a solver defect is actionable: either the
/// first variable found unassigned, or the first clause no literal
/// satisfies (with its contents).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// The solver reported no solution; there is nothing to check.
    NoSolution,
    UnassignedVar(Var),
    UnsatClause { index: usize, clause: Clause },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "all clauses satisfied"),
            Verdict::NoSolution => write!(f, "no solution to check"),
            Verdict::UnassignedVar(var) => {
                write!(f, "variable {var} unassigned in the solution")
            }
            Verdict::UnsatClause { index, clause } => {
                write!(f, "clause {} unsatisfied: {clause:?}", index + 1)
            }
        }
    }
}

/// Checks that `assignment` satisfies every clause of `formula`.
///
/// Written independently of the solver's clause evaluation on purpose:
/// this is the oracle that catches solver defects, so it must not share
/// code with what it checks.
pub fn verify(formula: &Formula, assignment: Option<&Assignment>) -> Verdict {
    let Some(assignment) = assignment else {
        return Verdict::NoSolution;
    };

    for (index, clause) in formula.clauses.iter().enumerate() {
        let mut satisfied = false;

        for &lit in clause {
            let var = to_var(lit);
            let Some(value) = assignment.value(var) else {
                return Verdict::UnassignedVar(var);
            };
            if value == lit.is_positive() {
                satisfied = true;
                break;
            }
        }

        if !satisfied {
            return Verdict::UnsatClause {
                index,
                clause: clause.clone(),
            };
        }
    }

    Verdict::Pass
}
