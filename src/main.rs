use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use phasat::bench::{run_sweep, Sweep};
use phasat::gen::{generate, progressive_sizes, CRITICAL_RATIO};
use phasat::io::{
    read_assignment, read_formula, write_formula, write_solution, write_summary, InstanceInfo,
};
use phasat::solver::Solver;
use phasat::verify::verify;

#[derive(Parser)]
#[command(about = "3-SAT phase-transition benchmark kit", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate hard 3-SAT instances at the phase-transition ratio.
    Generate {
        #[arg(long, default_value_t = 30)]
        count: usize,
        #[arg(long, default_value_t = 5)]
        min_vars: usize,
        #[arg(long, default_value_t = 200)]
        max_vars: usize,
        #[arg(long, default_value_t = CRITICAL_RATIO)]
        ratio: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Output directory for .cnf files and the batch summary.
        #[arg(long, default_value = "instances")]
        out: PathBuf,
    },
    /// Solve one DIMACS CNF file with the naive backtracking solver.
    Solve {
        input: PathBuf,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Also write the result block to INPUT.sol.
        #[arg(long)]
        sol: bool,
    },
    /// Check a solution file against its CNF instance.
    Verify {
        cnf: PathBuf,
        /// Solution file; defaults to CNF.sol.
        sol: Option<PathBuf>,
    },
    /// Run a generate -> solve -> verify sweep and report records.
    Bench {
        #[arg(long, default_value_t = 30)]
        count: usize,
        #[arg(long, default_value_t = 5)]
        min_vars: usize,
        #[arg(long, default_value_t = 200)]
        max_vars: usize,
        #[arg(long, default_value_t = CRITICAL_RATIO)]
        ratio: f64,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Keep the generated instances and solutions in this directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Generate {
            count,
            min_vars,
            max_vars,
            ratio,
            seed,
            out,
        } => cmd_generate(count, min_vars, max_vars, ratio, seed, out),
        Command::Solve {
            input,
            timeout_secs,
            sol,
        } => cmd_solve(input, timeout_secs, sol),
        Command::Verify { cnf, sol } => cmd_verify(cnf, sol),
        Command::Bench {
            count,
            min_vars,
            max_vars,
            ratio,
            timeout_secs,
            seed,
            out,
        } => {
            if min_vars < 1 || max_vars < min_vars {
                bail!("need 1 <= min-vars <= max-vars");
            }
            let sweep = Sweep {
                count,
                min_vars,
                max_vars,
                ratio,
                timeout: Some(Duration::from_secs(timeout_secs)),
                seed,
            };
            run_sweep(&sweep, out.as_deref())?;
            Ok(())
        }
    }
}

fn cmd_generate(
    count: usize,
    min_vars: usize,
    max_vars: usize,
    ratio: f64,
    seed: u64,
    out: PathBuf,
) -> anyhow::Result<()> {
    if min_vars < 1 || max_vars < min_vars {
        bail!("need 1 <= min-vars <= max-vars");
    }

    fs::create_dir_all(&out)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut infos = vec![];

    for (i, num_vars) in progressive_sizes(count, min_vars, max_vars).into_iter().enumerate() {
        let formula = generate(&mut rng, num_vars, ratio);
        let file_name = format!("generated_sat_{:03}.cnf", i + 1);

        let mut file = fs::File::create(out.join(&file_name))?;
        write_formula(&mut file, &formula, ratio)?;

        println!(
            "{file_name}: {} vars, {} clauses (ratio {ratio:.2})",
            formula.var_count,
            formula.clause_count()
        );

        infos.push(InstanceInfo {
            file_name,
            var_count: formula.var_count,
            clause_count: formula.clause_count(),
            ratio,
        });
    }

    let mut summary = fs::File::create(out.join("summary.txt"))?;
    write_summary(&mut summary, &infos)?;

    Ok(())
}

fn cmd_solve(input: PathBuf, timeout_secs: Option<u64>, sol: bool) -> anyhow::Result<()> {
    let mut file = fs::File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let formula = read_formula(&mut file).with_context(|| format!("parsing {}", input.display()))?;

    let mut solver = match timeout_secs {
        Some(secs) => Solver::with_deadline(
            &formula,
            std::time::Instant::now() + Duration::from_secs(secs),
        ),
        None => Solver::new(&formula),
    };
    let solution = solver.solve();

    println!("c nodes: {}", solver.nodes());
    write_solution(&mut std::io::stdout(), &solution)?;

    if sol {
        let mut path = input.into_os_string();
        path.push(".sol");
        let mut file = fs::File::create(&path)?;
        write_solution(&mut file, &solution)?;
    }

    Ok(())
}

fn cmd_verify(cnf: PathBuf, sol: Option<PathBuf>) -> anyhow::Result<()> {
    let sol = sol.unwrap_or_else(|| {
        let mut path = cnf.clone().into_os_string();
        path.push(".sol");
        path.into()
    });

    let mut cnf_file = fs::File::open(&cnf).with_context(|| format!("opening {}", cnf.display()))?;
    let formula = read_formula(&mut cnf_file)?;

    let mut sol_file = fs::File::open(&sol).with_context(|| format!("opening {}", sol.display()))?;
    let assignment = read_assignment(&mut sol_file, formula.var_count)?;

    let verdict = verify(&formula, Some(&assignment));
    println!("{verdict}");

    if !verdict.is_pass() {
        std::process::exit(1);
    }
    Ok(())
}
