use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use thiserror::Error;

use crate::types::{Assignment, Formula, Lit, Solution};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing `p cnf` header line")]
    MissingHeader,
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("invalid literal `{0}`")]
    InvalidLiteral(String),
    #[error("literal {lit} out of range for {var_count} variables")]
    LiteralOutOfRange { lit: Lit, var_count: usize },
    #[error("header declares {declared} clauses, found {found}")]
    ClauseCountMismatch { declared: usize, found: usize },
    #[error("unterminated clause at end of input")]
    UnterminatedClause,
}

/// Reads a formula in the DIMACS CNF subset: `c` comment lines, one
/// `p cnf <vars> <clauses>` line, then `0`-terminated clauses which may
/// span or share lines.
pub fn read_formula(reader: &mut impl Read) -> Result<Formula, ParseError> {
    let mut lines = BufReader::new(reader).lines();

    let (var_count, clause_count) = loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(ParseError::MissingHeader),
        };

        if line.starts_with('c') || line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[..] {
            ["p", "cnf", vars, clauses] => {
                let parse = |s: &str| {
                    s.parse::<usize>()
                        .map_err(|_| ParseError::MalformedHeader(line.clone()))
                };
                break (parse(vars)?, parse(clauses)?);
            }
            _ => return Err(ParseError::MalformedHeader(line)),
        }
    };

    let mut clauses = vec![];
    let mut clause = vec![];

    for line in lines {
        let line = line?;
        if line.starts_with('c') {
            continue;
        }

        for word in line.split_whitespace() {
            let lit = word
                .parse::<Lit>()
                .map_err(|_| ParseError::InvalidLiteral(word.to_string()))?;
            match lit {
                0 => {
                    clauses.push(std::mem::take(&mut clause));
                }
                _ => {
                    if to_magnitude(lit) > var_count {
                        return Err(ParseError::LiteralOutOfRange { lit, var_count });
                    }
                    clause.push(lit);
                }
            }
        }
    }

    if !clause.is_empty() {
        return Err(ParseError::UnterminatedClause);
    }

    if clauses.len() != clause_count {
        return Err(ParseError::ClauseCountMismatch {
            declared: clause_count,
            found: clauses.len(),
        });
    }

    Ok(Formula { var_count, clauses })
}

fn to_magnitude(lit: Lit) -> usize {
    lit.unsigned_abs() as usize
}

/// Writes `formula` in DIMACS format with a header describing the
/// generation parameters. The clause count written is the actual one,
/// which can be below the generation target when the attempt budget ran
/// out.
pub fn write_formula(writer: &mut impl Write, formula: &Formula, ratio: f64) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);

    writeln!(writer, "c Hard 3-SAT instance at phase transition threshold")?;
    writeln!(writer, "c Variables: {}", formula.var_count)?;
    writeln!(writer, "c Clauses: {}", formula.clauses.len())?;
    writeln!(writer, "c Ratio: {ratio:.2} (critical threshold)")?;
    writeln!(
        writer,
        "p cnf {} {}",
        formula.var_count,
        formula.clauses.len()
    )?;

    for clause in &formula.clauses {
        for lit in clause {
            write!(writer, "{lit} ")?;
        }
        writeln!(writer, "0")?;
    }

    writer.flush()
}

/// Writes the `s`/`v` result block.
pub fn write_solution(writer: &mut impl Write, solution: &Solution) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);

    let status = match solution {
        Solution::Sat { .. } => "SATISFIABLE",
        Solution::Unsat => "UNSATISFIABLE",
        Solution::Unknown => "UNKNOWN",
    };
    writeln!(writer, "s {status}")?;

    if let Solution::Sat { assignment } = solution {
        const PER_LINE: usize = 10;
        let literals: Vec<Lit> = assignment.literals().collect();
        for chunk in literals.chunks(PER_LINE) {
            let chunk_str = chunk
                .iter()
                .fold(String::new(), |str, lit| str + &lit.to_string() + " ");
            writeln!(writer, "v {chunk_str}")?;
        }
        writeln!(writer, "v 0")?;
    }

    writer.flush()
}

/// Reads the `v` lines of a solution file into an assignment over
/// `var_count` variables. Comment and status lines are skipped; literals
/// out of range are rejected.
pub fn read_assignment(
    reader: &mut impl Read,
    var_count: usize,
) -> Result<Assignment, ParseError> {
    let mut assignment = Assignment::new(var_count);

    for line in BufReader::new(reader).lines() {
        let line = line?;
        let Some(rest) = line.strip_prefix('v') else {
            continue;
        };

        for word in rest.split_whitespace() {
            let lit = word
                .parse::<Lit>()
                .map_err(|_| ParseError::InvalidLiteral(word.to_string()))?;
            if lit == 0 {
                return Ok(assignment);
            }
            if to_magnitude(lit) > var_count {
                return Err(ParseError::LiteralOutOfRange { lit, var_count });
            }
            assignment.set_literal(lit);
        }
    }

    Ok(assignment)
}

/// One line of the batch summary written next to generated instances.
pub struct InstanceInfo {
    pub file_name: String,
    pub var_count: usize,
    pub clause_count: usize,
    pub ratio: f64,
}

/// Writes the human-readable companion summary for a generated batch.
pub fn write_summary(writer: &mut impl Write, instances: &[InstanceInfo]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);

    writeln!(writer, "3-SAT benchmark instances (phase transition)")?;
    writeln!(writer, "Total instances: {}", instances.len())?;
    writeln!(writer)?;

    for (i, info) in instances.iter().enumerate() {
        writeln!(
            writer,
            "{:3}. {}  vars: {:4} | clauses: {:5} | ratio: {:.2}",
            i + 1,
            info.file_name,
            info.var_count,
            info.clause_count,
            info.ratio
        )?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use crate::types::{Formula, Solution};

    use super::{read_assignment, read_formula, write_formula, write_solution, ParseError};

    #[test]
    fn basic() {
        let input = b"c whatever\np cnf 2 2\n1 2 0\n1 -2 0";
        let Formula { var_count, clauses } = read_formula(&mut input.as_slice()).unwrap();
        assert_eq!(var_count, 2);
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0], vec![1, 2]);
        assert_eq!(clauses[1], vec![1, -2]);
    }

    #[test]
    fn split() {
        let input = b"c whatever\np cnf 1 1\n1 1\n-1 -1 0";
        let Formula { clauses, .. } = read_formula(&mut input.as_slice()).unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0], vec![1, 1, -1, -1]);
    }

    #[test]
    fn rejects_missing_header() {
        let input = b"c only comments\n";
        assert!(matches!(
            read_formula(&mut input.as_slice()),
            Err(ParseError::MissingHeader)
        ));
    }

    #[test]
    fn rejects_out_of_range_literal() {
        let input = b"p cnf 2 1\n1 3 0\n";
        assert!(matches!(
            read_formula(&mut input.as_slice()),
            Err(ParseError::LiteralOutOfRange { lit: 3, .. })
        ));
    }

    #[test]
    fn rejects_clause_count_mismatch() {
        let input = b"p cnf 2 3\n1 2 0\n";
        assert!(matches!(
            read_formula(&mut input.as_slice()),
            Err(ParseError::ClauseCountMismatch {
                declared: 3,
                found: 1
            })
        ));
    }

    #[test]
    fn formula_roundtrip() {
        let formula = Formula {
            var_count: 3,
            clauses: vec![vec![1, -2, 3], vec![-1, 2, -3]],
        };

        let mut buf = vec![];
        write_formula(&mut buf, &formula, 4.26).unwrap();
        let read_back = read_formula(&mut buf.as_slice()).unwrap();

        assert_eq!(read_back, formula);
    }

    #[test]
    fn solution_roundtrip() {
        let mut assignment = crate::types::Assignment::new(3);
        assignment.set(1, true);
        assignment.set(2, false);
        assignment.set(3, true);

        let mut buf = vec![];
        write_solution(&mut buf, &Solution::Sat { assignment: assignment.clone() }).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("s SATISFIABLE"));

        let read_back = read_assignment(&mut buf.as_slice(), 3).unwrap();
        assert_eq!(read_back, assignment);
    }

    #[test]
    fn unsat_solution_has_no_values() {
        let mut buf = vec![];
        write_solution(&mut buf, &Solution::Unsat).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "s UNSATISFIABLE\n");
    }
}
