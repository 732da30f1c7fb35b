//! Builds the mixed integer program: integer per-worker instance counts
//! `B[w]`, binary per-(slice, worker) assignment `A[s,w]`, the assignment,
//! capacity, and cap constraints, and the cost-minimizing objective.
//!
//! Shape and variable naming follow the teacher's `optimiser.rs` bin-packing
//! model directly — only the constraint content differs (no CPU/memory
//! vectors here, a single scalar load per slice/worker pair instead).

use good_lp::{constraint, variable, Expression, ProblemVariables, SolverModel, Variable};

use crate::domain::{Slice, WorkerConfig};
use crate::load::LoadMatrix;

/// Decision variables of the MILP, indexed the same way as the `workers`/
/// `slices` slices used to build them. `assignment[s][w]` is `None` when
/// `load[s][w]` is infinite — no variable is created for forbidden pairings.
pub struct DecisionVariables {
    pub counts: Vec<Variable>,
    pub assignment: Vec<Vec<Option<Variable>>>,
}

pub fn create_decision_variables(
    vars: &mut ProblemVariables,
    workers: &[WorkerConfig],
    load: &LoadMatrix,
) -> DecisionVariables {
    let counts: Vec<Variable> = workers
        .iter()
        .map(|w| {
            let var = variable().integer().min(0.0).name(format!("B_{}", w.id));
            let var = match w.max_limit {
                Some(limit) => var.max(limit as f64),
                None => var,
            };
            vars.add(var)
        })
        .collect();

    let assignment: Vec<Vec<Option<Variable>>> = load
        .iter()
        .enumerate()
        .map(|(s, row)| {
            row.iter()
                .enumerate()
                .map(|(w, &l)| {
                    if l.is_finite() {
                        Some(vars.add(variable().binary().name(format!("A_{s}_{w}"))))
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect();

    DecisionVariables { counts, assignment }
}

pub fn build_objective(workers: &[WorkerConfig], dv: &DecisionVariables) -> Expression {
    workers
        .iter()
        .zip(&dv.counts)
        .map(|(w, &b)| b * w.cost)
        .sum()
}

/// Adds the assignment, capacity, and cap constraints to `problem`. Assumes
/// every slice has at least one candidate worker — callers must check
/// [`crate::load::unassignable_slices`] before reaching this point.
pub fn add_constraints<P: SolverModel>(
    mut problem: P,
    workers: &[WorkerConfig],
    slices: &[Slice],
    load: &LoadMatrix,
    dv: &DecisionVariables,
) -> P {
    // Assignment: each slice goes to exactly one candidate worker.
    for (s, _) in slices.iter().enumerate() {
        let total: Expression = dv.assignment[s]
            .iter()
            .filter_map(|v| *v)
            .map(Expression::from)
            .sum();
        problem = problem.with(constraint!(total == 1));
    }

    // Capacity: the summed load a worker's assigned slices impose must not
    // exceed the number of instances provisioned.
    for (w, &b) in dv.counts.iter().enumerate() {
        let used: Expression = slices
            .iter()
            .enumerate()
            .filter_map(|(s, _)| dv.assignment[s][w].map(|a| a * load[s][w]))
            .sum();
        problem = problem.with(constraint!(used <= b));
    }

    let _ = workers; // kept for signature symmetry with the teacher's add_constraints
    problem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkerConfig;
    use good_lp::{variables, Solution};

    fn worker(id: &str, cost: f64, max_limit: Option<u32>) -> WorkerConfig {
        WorkerConfig {
            id: id.into(),
            accelerator_type: "L4".into(),
            accelerator_count: 1,
            model_server_type: "VLLM".into(),
            cost,
            max_limit,
        }
    }

    #[test]
    fn no_variable_created_for_infinite_load() {
        let workers = vec![worker("A", 1.0, None)];
        let load: LoadMatrix = vec![vec![f64::INFINITY]];
        let mut vars = variables!();
        let dv = create_decision_variables(&mut vars, &workers, &load);
        assert!(dv.assignment[0][0].is_none());
    }

    #[test]
    fn variable_created_for_finite_load() {
        let workers = vec![worker("A", 1.0, None)];
        let load: LoadMatrix = vec![vec![0.5]];
        let mut vars = variables!();
        let dv = create_decision_variables(&mut vars, &workers, &load);
        assert!(dv.assignment[0][0].is_some());
    }

    #[test]
    fn objective_reflects_per_worker_cost_when_solved() {
        let workers = vec![worker("A", 3.0, None), worker("B", 5.0, None)];
        let load: LoadMatrix = vec![];
        let mut vars = variables!();
        let dv = create_decision_variables(&mut vars, &workers, &load);
        let objective = build_objective(&workers, &dv);

        let mut problem = vars.minimise(objective).using(good_lp::solvers::highs::highs);
        problem = problem.with(constraint!(dv.counts[0] >= 2.0));
        problem = problem.with(constraint!(dv.counts[1] >= 1.0));
        let solution = problem.solve().unwrap();

        assert!((solution.value(dv.counts[0]) - 2.0).abs() < 1e-6);
        assert!((solution.value(dv.counts[1]) - 1.0).abs() < 1e-6);
        let total_cost = 3.0 * solution.value(dv.counts[0]) + 5.0 * solution.value(dv.counts[1]);
        assert!((total_cost - 11.0).abs() < 1e-6);
    }
}
