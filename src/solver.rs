use std::time::Instant;

use crate::types::{to_var, Assignment, Clause, Formula, Solution, Var};

/// The deadline is only polled once per this many search nodes;
/// `Instant::now` is too expensive to call on every node.
const DEADLINE_CHECK_MASK: u64 = 0xFFF;

enum ClauseState {
    Satisfied,
    Violated,
    Undecided,
}

struct Interrupted;

/// Exhaustive backtracking search for a satisfying assignment.
///
/// This is deliberately the naive baseline: no propagation, no learned
/// clauses, no branching heuristic. Each node evaluates every clause,
/// fails on the first violated one, and otherwise branches on the first
/// unassigned variable found scanning clauses in formula order. Worst
/// case is `O(2^n)` nodes; recursion depth is bounded by the variable
/// count.
pub struct Solver<'a> {
    formula: &'a Formula,
    assignment: Assignment,
    nodes: u64,
    deadline: Option<Instant>,
}

impl<'a> Solver<'a> {
    pub fn new(formula: &'a Formula) -> Self {
        Self {
            formula,
            assignment: Assignment::new(formula.var_count),
            nodes: 0,
            deadline: None,
        }
    }

    /// Like [`Solver::new`], but `solve` gives up and returns
    /// [`Solution::Unknown`] once `deadline` has passed.
    pub fn with_deadline(formula: &'a Formula, deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::new(formula)
        }
    }

    /// Search nodes expanded so far.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn solve(&mut self) -> Solution {
        match self.search() {
            Ok(true) => Solution::Sat {
                assignment: self.assignment.clone(),
            },
            Ok(false) => Solution::Unsat,
            Err(Interrupted) => Solution::Unknown,
        }
    }

    fn search(&mut self) -> Result<bool, Interrupted> {
        self.nodes += 1;
        self.check_deadline()?;

        let mut all_satisfied = true;
        for clause in &self.formula.clauses {
            match self.eval_clause(clause) {
                ClauseState::Violated => return Ok(false),
                ClauseState::Undecided => all_satisfied = false,
                ClauseState::Satisfied => (),
            }
        }

        if all_satisfied {
            return Ok(true);
        }

        let Some(var) = self.first_unassigned() else {
            return Ok(false);
        };

        self.assignment.set(var, true);
        if self.search()? {
            return Ok(true);
        }

        self.assignment.set(var, false);
        if self.search()? {
            return Ok(true);
        }

        self.assignment.unset(var);
        Ok(false)
    }

    fn eval_clause(&self, clause: &Clause) -> ClauseState {
        let mut undecided = false;
        for &lit in clause {
            match self.assignment.value(to_var(lit)) {
                None => undecided = true,
                Some(value) => {
                    if value == lit.is_positive() {
                        return ClauseState::Satisfied;
                    }
                }
            }
        }

        if undecided {
            ClauseState::Undecided
        } else {
            ClauseState::Violated
        }
    }

    /// First unassigned variable encountered scanning clauses in formula
    /// order. Deterministic; the only "heuristic" the baseline has.
    fn first_unassigned(&self) -> Option<Var> {
        self.formula
            .clauses
            .iter()
            .flatten()
            .map(|&lit| to_var(lit))
            .find(|&var| self.assignment.value(var).is_none())
    }

    fn check_deadline(&self) -> Result<(), Interrupted> {
        if let Some(deadline) = self.deadline {
            // Triggers on the first node, then every 4096th.
            if self.nodes & DEADLINE_CHECK_MASK == 1 && Instant::now() >= deadline {
                return Err(Interrupted);
            }
        }
        Ok(())
    }
}

/// Convenience wrapper for one-shot solves.
pub fn solve(formula: &Formula) -> Solution {
    Solver::new(formula).solve()
}
