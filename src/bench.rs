use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use crate::gen::{generate, progressive_sizes, CRITICAL_RATIO};
use crate::io::{write_formula, write_solution, write_summary, InstanceInfo};
use crate::solver::Solver;
use crate::types::{Assignment, Formula, Solution};
use crate::verify::verify;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Sat,
    Unsat,
    Timeout,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Sat => "SAT",
            Status::Unsat => "UNSAT",
            Status::Timeout => "TIMEOUT",
        };
        write!(f, "{s}")
    }
}

/// Per-instance result record; the boundary downstream analysis tooling
/// consumes. No assignment on UNSAT or TIMEOUT.
pub struct Record {
    pub status: Status,
    pub elapsed: Duration,
    pub nodes: u64,
    pub assignment: Option<Assignment>,
}

/// Times one solve, imposing `timeout` as a wall-clock deadline. A SAT
/// answer is cross-checked with the independent verifier; an oracle
/// failure is logged as a solver defect but still recorded as SAT.
pub fn run(formula: &Formula, timeout: Option<Duration>) -> Record {
    let start = Instant::now();
    let mut solver = match timeout {
        Some(timeout) => Solver::with_deadline(formula, start + timeout),
        None => Solver::new(formula),
    };

    let solution = solver.solve();
    let elapsed = start.elapsed();
    let nodes = solver.nodes();

    match solution {
        Solution::Sat { assignment } => {
            let verdict = verify(formula, Some(&assignment));
            if !verdict.is_pass() {
                error!(%verdict, "solver returned an invalid model");
            }
            Record {
                status: Status::Sat,
                elapsed,
                nodes,
                assignment: Some(assignment),
            }
        }
        Solution::Unsat => Record {
            status: Status::Unsat,
            elapsed,
            nodes,
            assignment: None,
        },
        Solution::Unknown => Record {
            status: Status::Timeout,
            elapsed,
            nodes,
            assignment: None,
        },
    }
}

/// A generate -> solve -> verify sweep over linearly growing sizes at a
/// fixed clause/variable ratio.
pub struct Sweep {
    pub count: usize,
    pub min_vars: usize,
    pub max_vars: usize,
    pub ratio: f64,
    pub timeout: Option<Duration>,
    pub seed: u64,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            count: 30,
            min_vars: 5,
            max_vars: 200,
            ratio: CRITICAL_RATIO,
            timeout: Some(Duration::from_secs(30)),
            seed: 0,
        }
    }
}

/// Runs the sweep. When `out_dir` is given, each instance is written as
/// `generated_sat_NNN.cnf`, SAT results get a `.cnf.sol` companion, and a
/// batch summary is written at the end.
pub fn run_sweep(sweep: &Sweep, out_dir: Option<&Path>) -> std::io::Result<Vec<Record>> {
    let mut rng = StdRng::seed_from_u64(sweep.seed);
    let sizes = progressive_sizes(sweep.count, sweep.min_vars, sweep.max_vars);

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir)?;
    }

    let mut records = Vec::with_capacity(sizes.len());
    let mut infos = Vec::with_capacity(sizes.len());

    for (i, &num_vars) in sizes.iter().enumerate() {
        let formula = generate(&mut rng, num_vars, sweep.ratio);
        let file_name = format!("generated_sat_{:03}.cnf", i + 1);

        if let Some(dir) = out_dir {
            let mut file = fs::File::create(dir.join(&file_name))?;
            write_formula(&mut file, &formula, sweep.ratio)?;
        }

        let record = run(&formula, sweep.timeout);

        info!(
            instance = %file_name,
            vars = formula.var_count,
            clauses = formula.clause_count(),
            status = %record.status,
            time_s = record.elapsed.as_secs_f64(),
            nodes = record.nodes,
            "instance solved"
        );

        if let (Some(dir), Some(assignment)) = (out_dir, &record.assignment) {
            let mut file = fs::File::create(dir.join(format!("{file_name}.sol")))?;
            write_solution(
                &mut file,
                &Solution::Sat {
                    assignment: assignment.clone(),
                },
            )?;
        }

        infos.push(InstanceInfo {
            file_name,
            var_count: formula.var_count,
            clause_count: formula.clause_count(),
            ratio: sweep.ratio,
        });
        records.push(record);
    }

    if let Some(dir) = out_dir {
        let mut file = fs::File::create(dir.join("summary.txt"))?;
        write_summary(&mut file, &infos)?;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::types::Formula;

    use super::{run, run_sweep, Status, Sweep};

    #[test]
    fn sat_record_carries_assignment() {
        let formula = Formula {
            var_count: 2,
            clauses: vec![vec![1, 2], vec![-1, 2]],
        };

        let record = run(&formula, None);
        assert_eq!(record.status, Status::Sat);
        assert!(record.assignment.is_some());
        assert!(record.nodes >= 1);
    }

    #[test]
    fn unsat_record_has_no_assignment() {
        let formula = Formula {
            var_count: 1,
            clauses: vec![vec![1], vec![-1]],
        };

        let record = run(&formula, None);
        assert_eq!(record.status, Status::Unsat);
        assert!(record.assignment.is_none());
    }

    #[test]
    fn expired_timeout_reports_timeout() {
        let formula = Formula {
            var_count: 2,
            clauses: vec![vec![1, 2], vec![-1, 2]],
        };

        let record = run(&formula, Some(Duration::ZERO));
        assert_eq!(record.status, Status::Timeout);
        assert!(record.assignment.is_none());
    }

    #[test]
    fn sweep_produces_one_record_per_size() {
        let sweep = Sweep {
            count: 4,
            min_vars: 3,
            max_vars: 12,
            timeout: None,
            seed: 1,
            ..Sweep::default()
        };

        let records = run_sweep(&sweep, None).unwrap();
        assert_eq!(records.len(), 4);
        for record in &records {
            assert_ne!(record.status, Status::Timeout);
        }
    }
}
