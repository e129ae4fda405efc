use std::collections::HashSet;

use rand::{seq::index::sample, seq::SliceRandom, Rng};

use crate::types::{Clause, Formula, Lit};

/// Clause/variable ratio at the 3-SAT phase transition, where random
/// instances are empirically hardest: roughly half are satisfiable and
/// there is no structure a solver could exploit.
pub const CRITICAL_RATIO: f64 = 4.26;

/// Generates a random 3-SAT formula over `num_vars` variables with
/// `floor(num_vars * ratio)` clauses.
///
/// Each clause picks `min(3, num_vars)` distinct variables without
/// replacement and gives each a 50/50 polarity, so no clause contains
/// both `x` and `-x`. Candidates whose exact literal tuple was already
/// accepted are rejected; the attempt budget is ten times the target, and
/// exhausting it returns a smaller (still valid) formula rather than an
/// error. Accepted clauses are shuffled before being returned.
pub fn generate(rng: &mut impl Rng, num_vars: usize, ratio: f64) -> Formula {
    assert!(num_vars >= 1);
    assert!(ratio > 0.0);

    let target = (num_vars as f64 * ratio) as usize;
    let max_attempts = 10 * target;
    let k = num_vars.min(3);

    let mut seen: HashSet<Clause> = HashSet::with_capacity(target);
    let mut clauses: Vec<Clause> = Vec::with_capacity(target);
    let mut attempts = 0;

    while clauses.len() < target && attempts < max_attempts {
        attempts += 1;

        let clause: Clause = sample(rng, num_vars, k)
            .into_iter()
            .map(|i| {
                let var = (i + 1) as Lit;
                if rng.gen_bool(0.5) {
                    var
                } else {
                    -var
                }
            })
            .collect();

        // Identity is the literal tuple as sampled; permutations of the
        // same literal set count as distinct clauses.
        if seen.insert(clause.clone()) {
            clauses.push(clause);
        }
    }

    clauses.shuffle(rng);

    Formula {
        var_count: num_vars,
        clauses,
    }
}

/// Variable counts linearly interpolated between `min_vars` and
/// `max_vars`, truncated to integers.
pub fn progressive_sizes(count: usize, min_vars: usize, max_vars: usize) -> Vec<usize> {
    assert!(min_vars <= max_vars);

    if count <= 1 {
        return vec![min_vars];
    }

    let step = (max_vars - min_vars) as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| (min_vars as f64 + i as f64 * step) as usize)
        .collect()
}
