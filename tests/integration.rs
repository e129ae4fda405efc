use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use phasat::bench::{run, Status};
use phasat::gen::{generate, progressive_sizes, CRITICAL_RATIO};
use phasat::io::{read_formula, write_formula};
use phasat::solver::solve;
use phasat::types::{to_var, Assignment, Formula, Solution};
use phasat::verify::{verify, Verdict};

fn formula(clauses: Vec<Vec<i32>>) -> Formula {
    let var_count = clauses
        .iter()
        .flatten()
        .map(|&lit| to_var(lit))
        .max()
        .unwrap_or(0);
    Formula { var_count, clauses }
}

/// Satisfiability by enumerating all `2^n` total assignments.
fn brute_force_sat(formula: &Formula) -> bool {
    let n = formula.var_count;
    'outer: for bits in 0..(1u64 << n) {
        let mut assignment = Assignment::new(n);
        for var in 1..=n {
            assignment.set(var, bits >> (var - 1) & 1 == 1);
        }
        for clause in &formula.clauses {
            let satisfied = clause.iter().any(|&lit| {
                assignment.value(to_var(lit)) == Some(lit.is_positive())
            });
            if !satisfied {
                continue 'outer;
            }
        }
        return true;
    }
    false
}

#[test]
fn scenario_a_sat_and_verified() {
    let formula = formula(vec![vec![1, 2], vec![-1, 2], vec![1, -2]]);

    match solve(&formula) {
        Solution::Sat { assignment } => {
            assert_eq!(verify(&formula, Some(&assignment)), Verdict::Pass);
        }
        _ => panic!("expected SAT"),
    }
}

#[test]
fn scenario_b_unsat_and_no_solution_verdict() {
    let formula = formula(vec![vec![1], vec![-1]]);

    assert!(matches!(solve(&formula), Solution::Unsat));
    assert_eq!(verify(&formula, None), Verdict::NoSolution);
}

#[test]
fn scenario_c_generated_instance_bounds() {
    let mut rng = StdRng::seed_from_u64(5);
    let formula = generate(&mut rng, 5, 4.26);

    assert!(formula.clauses.len() <= 21);

    let mut tuples = HashSet::new();
    for clause in &formula.clauses {
        assert!(clause.len() <= 3);

        let vars: HashSet<_> = clause.iter().map(|&lit| to_var(lit)).collect();
        assert_eq!(vars.len(), clause.len());
        assert!(vars.iter().all(|&var| (1..=5).contains(&var)));

        assert!(tuples.insert(clause.clone()), "duplicate tuple {clause:?}");
    }
}

#[test]
fn scenario_d_progressive_sizes() {
    assert_eq!(progressive_sizes(5, 5, 25), vec![5, 10, 15, 20, 25]);
}

#[test]
fn soundness_on_generated_instances() {
    let mut rng = StdRng::seed_from_u64(11);

    for num_vars in [3, 5, 8, 12] {
        let formula = generate(&mut rng, num_vars, CRITICAL_RATIO);
        if let Solution::Sat { assignment } = solve(&formula) {
            assert_eq!(verify(&formula, Some(&assignment)), Verdict::Pass);
        }
    }
}

#[test]
fn matches_brute_force_on_small_instances() {
    let mut rng = StdRng::seed_from_u64(23);

    for num_vars in [2, 4, 6, 8, 10] {
        for _ in 0..3 {
            let formula = generate(&mut rng, num_vars, CRITICAL_RATIO);
            let solver_sat = matches!(solve(&formula), Solution::Sat { .. });
            assert_eq!(solver_sat, brute_force_sat(&formula));
        }
    }
}

#[test]
fn solver_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(31);
    let formula = generate(&mut rng, 10, CRITICAL_RATIO);

    match (solve(&formula), solve(&formula)) {
        (Solution::Sat { assignment: a }, Solution::Sat { assignment: b }) => assert_eq!(a, b),
        (Solution::Unsat, Solution::Unsat) => (),
        _ => panic!("two solves of one formula disagreed"),
    }
}

#[test]
fn generated_instances_survive_dimacs_roundtrip() {
    let mut rng = StdRng::seed_from_u64(47);
    let formula = generate(&mut rng, 15, CRITICAL_RATIO);

    let mut buf = vec![];
    write_formula(&mut buf, &formula, CRITICAL_RATIO).unwrap();
    let read_back = read_formula(&mut buf.as_slice()).unwrap();

    assert_eq!(read_back, formula);
}

#[test]
fn driver_records_solved_instances() {
    let mut rng = StdRng::seed_from_u64(53);
    let formula = generate(&mut rng, 10, CRITICAL_RATIO);

    let record = run(&formula, None);
    assert!(record.nodes >= 1);
    match record.status {
        Status::Sat => {
            let assignment = record.assignment.expect("SAT record carries a model");
            assert_eq!(verify(&formula, Some(&assignment)), Verdict::Pass);
        }
        Status::Unsat => assert!(record.assignment.is_none()),
        Status::Timeout => panic!("no deadline was set"),
    }
}
