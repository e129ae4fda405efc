pub type Var = usize;

pub type Lit = i32;

pub fn to_var(lit: Lit) -> Var {
    lit.unsigned_abs() as Var
}

pub type Clause = Vec<Lit>;

/// An immutable CNF formula over variables `1..=var_count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formula {
    pub var_count: usize,
    pub clauses: Vec<Clause>,
}

impl Formula {
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn ratio(&self) -> f64 {
        if self.var_count == 0 {
            0.0
        } else {
            self.clauses.len() as f64 / self.var_count as f64
        }
    }
}

/// A partial mapping from variables to boolean values.
///
/// Slot 0 is unused so variables index directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<Option<bool>>,
}

impl Assignment {
    pub fn new(var_count: usize) -> Self {
        Self {
            values: vec![None; var_count + 1],
        }
    }

    pub fn var_count(&self) -> usize {
        self.values.len() - 1
    }

    pub fn value(&self, var: Var) -> Option<bool> {
        self.values.get(var).copied().flatten()
    }

    pub fn set(&mut self, var: Var, value: bool) {
        self.values[var] = Some(value);
    }

    pub fn unset(&mut self, var: Var) {
        self.values[var] = None;
    }

    pub fn assigned_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Assigned variables in increasing order, as signed literals.
    pub fn literals(&self) -> impl Iterator<Item = Lit> + '_ {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(var, value)| value.map(|v| if v { var as Lit } else { -(var as Lit) }))
    }

    pub fn set_literal(&mut self, lit: Lit) {
        self.set(to_var(lit), lit.is_positive());
    }
}

pub enum Solution {
    Sat { assignment: Assignment },
    Unsat,
    Unknown,
}
