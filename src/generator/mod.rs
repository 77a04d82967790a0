//! Template based code generation.
//!
//! The synthesized and solved systems are flattened into a serializable view
//! and rendered with `minijinja`. Three templates ship with the crate.
//! `class` emits a C++ class whose `run()` evaluates the solved assignments
//! and refreshes the discretization auxiliaries. `dense` and `sparse` emit a
//! class that assembles `A x = b` and solves it with Eigen at run time, using
//! `JacobiSVD` on a fixed-size matrix or `SparseLU` on inserted coefficients.
//! Any other template file can be supplied; it sees the same view.

use std::path::PathBuf;

use anyhow::Context;
use minijinja::Environment;
use serde::Serialize;

use crate::compiler::{SolvedSystem, System};
use crate::ir::ast::Equation;
use crate::ir::transform::substitute::Substitution;
use crate::solver::LinearSystem;

const CLASS_TEMPLATE: &str = include_str!("templates/class.jinja");
const DENSE_TEMPLATE: &str = include_str!("templates/dense.jinja");
const SPARSE_TEMPLATE: &str = include_str!("templates/sparse.jinja");

/// Which template to render.
#[derive(Clone, Debug, PartialEq)]
pub enum Template {
    Class,
    Dense,
    Sparse,
    File(PathBuf),
}

impl std::str::FromStr for Template {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "class" => Template::Class,
            "dense" => Template::Dense,
            "sparse" => Template::Sparse,
            path => Template::File(PathBuf::from(path)),
        })
    }
}

pub fn warn(msg: String) -> String {
    log::warn!("{}", msg);
    String::new()
}

#[derive(Debug, Serialize)]
struct Assignment {
    lhs: String,
    rhs: String,
}

impl From<&Equation> for Assignment {
    fn from(equation: &Equation) -> Self {
        Self {
            lhs: equation.lhs.to_string(),
            rhs: equation.rhs.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Cell {
    row: usize,
    col: usize,
    value: String,
}

#[derive(Debug, Serialize)]
struct MatrixView {
    rows: usize,
    cols: usize,
    square: bool,
    /// Non-zero coefficients, row major.
    entries: Vec<Cell>,
    b: Vec<String>,
}

impl From<&LinearSystem> for MatrixView {
    fn from(system: &LinearSystem) -> Self {
        let (rows, cols) = system.a.dim();
        let entries = system
            .a
            .indexed_iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|((row, col), value)| Cell {
                row,
                col,
                value: value.to_string(),
            })
            .collect();
        Self {
            rows,
            cols,
            square: rows == cols,
            entries,
            b: system.b.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelView {
    name: String,
    /// `None` when the timestep is left symbolic.
    timestep: Option<f64>,
    edges: Vec<String>,
    parameters: Vec<String>,
    support_values: Vec<String>,
    /// Edges, parameters and support values, each group sorted.
    members: Vec<String>,
    assignments: Vec<Assignment>,
    support: Vec<Assignment>,
    unknowns: Vec<String>,
    matrix: Option<MatrixView>,
}

impl ModelView {
    fn new(
        name: &str,
        system: &System,
        solved: &SolvedSystem,
        matrix: Option<MatrixView>,
    ) -> Self {
        let mut edges: Vec<String> = system
            .topology
            .edges()
            .iter()
            .map(|e| e.alias().to_string())
            .collect();
        edges.sort();
        let mut parameters: Vec<String> = system
            .values
            .iter()
            .filter(|v| !v.replace())
            .map(|v| v.name().to_string())
            .collect();
        parameters.sort();
        let mut support_values: Vec<String> = solved
            .auxiliaries
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        support_values.sort();

        let members = edges
            .iter()
            .chain(&parameters)
            .chain(&support_values)
            .cloned()
            .collect();
        let timestep = Some(system.timestep.value())
            .filter(|dt| system.timestep.replace() && *dt != 0.0);

        Self {
            name: name.to_string(),
            timestep,
            edges,
            parameters,
            support_values,
            members,
            assignments: solved.equations.iter().map(Assignment::from).collect(),
            support: solved.support.iter().map(Assignment::from).collect(),
            unknowns: system.unknowns.iter().map(|u| u.name().to_string()).collect(),
            matrix,
        }
    }
}

/// Renders `template` for the model called `name`.
///
/// The dense matrices are built from the merged equations after
/// `substitution`; they are required by [`Template::Dense`] and
/// [`Template::Sparse`] and offered to user templates when the system is
/// linear.
pub fn generate(
    system: &System,
    solved: &SolvedSystem,
    substitution: &Substitution,
    template: &Template,
    name: &str,
) -> anyhow::Result<String> {
    let source = match template {
        Template::Class => CLASS_TEMPLATE.to_string(),
        Template::Dense => DENSE_TEMPLATE.to_string(),
        Template::Sparse => SPARSE_TEMPLATE.to_string(),
        Template::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?,
    };

    let matrix = match template {
        Template::Class => None,
        Template::Dense | Template::Sparse => {
            Some(MatrixView::from(&system.linear_system(substitution)?))
        }
        Template::File(_) => match system.linear_system(substitution) {
            Ok(linear) => Some(MatrixView::from(&linear)),
            Err(err) => {
                log::debug!("no dense form for template: {}", err);
                None
            }
        },
    };

    let view = ModelView::new(name, system, solved, matrix);

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_function("warn", warn);
    env.add_template("template", &source)?;
    let tmpl = env.get_template("template")?;
    let txt = tmpl
        .render(&view)
        .context("template rendering failed")?;
    Ok(txt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{synthesize, Session};
    use crate::ir::ast::{eq, mul, Edge, Node};
    use crate::ir::context::SynthesisContext;
    use crate::solver::GaussJordan;

    fn divider(session: &mut Session<'_>) {
        let input = Node::new("in");
        let mid = Node::new("mid");
        let gnd = Node::ground("gnd");
        let v0 = Edge::with_alias(&gnd, &input, "V0");
        let r1 = Edge::with_alias(&input, &mid, "R1");
        let r2 = Edge::with_alias(&mid, &gnd, "R2");
        let vin = session.value("vin");
        let p_v0 = session.potential(&v0);
        session.equation(eq(&p_v0, &vin));
        let p_r1 = session.potential(&r1);
        let f_r1 = session.flow(&r1);
        session.equation(eq(&p_r1, mul(2.0, &f_r1)));
        let p_r2 = session.potential(&r2);
        let f_r2 = session.flow(&r2);
        session.equation(eq(&p_r2, mul(1.0, &f_r2)));
        let f_v0 = session.flow(&v0);
        session.unknowns([p_v0, f_v0, p_r1, f_r1, p_r2, f_r2]);
    }

    fn render(template: &Template) -> String {
        let mut ctx = SynthesisContext::new();
        let system = synthesize(&mut ctx, &divider);
        let mut substitution = Substitution::new();
        substitution.insert(ctx.lookup("vin").unwrap().clone(), 9.0);
        let solved = system.solve(&GaussJordan::new(), &substitution).unwrap();
        generate(&system, &solved, &substitution, template, "Divider").unwrap()
    }

    #[test]
    fn test_class_template() {
        let txt = render(&Template::Class);
        assert!(txt.contains("class Divider {"));
        assert!(txt.contains("    analog_pair_t R1, R2, V0;\n"));
        assert!(txt.contains("    analog_value_t vin;\n"));
        assert!(txt.contains("        R1(),\n"));
        assert!(txt.contains("        vin()\n"));
        assert!(txt.contains("analog_time_t ts = _system_timestep();"));
        assert!(txt.contains("        V0.pot = 9.0;\n"));
        assert!(!txt.contains("Support variables"));
    }

    #[test]
    fn test_dense_template() {
        let txt = render(&Template::Dense);
        assert!(txt.contains("#include <Eigen/Dense>\n"));
        assert!(txt.contains("class Divider {"));
        assert!(txt.contains("    Eigen::Matrix<double, 6, 6> A;\n"));
        assert!(txt.contains("    Eigen::Matrix<double, 6, 1> b;\n"));
        assert!(txt.contains("    analog_pair_t R1, R2, V0;\n"));
        assert!(txt.contains("        solver(),\n        R1(),\n"));
        assert!(txt.contains("        A(0, 0) = 1.0;\n"));
        assert!(txt.contains("        solver.compute(A, Eigen::ComputeFullU | Eigen::ComputeFullV);\n"));
        assert!(txt.contains("        b(0) = 9.0;\n"));
        assert!(txt.contains("        auto solution = solver.solve(b);\n"));
        assert!(txt.contains("        V0.pot = solution(0);\n"));
        assert!(txt.contains("        R2.flw = solution(5);\n"));
        assert!(!txt.contains("A.insert"));
    }

    #[test]
    fn test_sparse_template() {
        let txt = render(&Template::Sparse);
        assert!(txt.contains("#include <Eigen/Sparse>\n"));
        assert!(txt.contains("class Divider {"));
        assert!(txt.contains("    Eigen::SparseLU<Eigen::SparseMatrix<double>> solver;\n"));
        assert!(txt.contains("        A(6, 6),\n        b(6),\n"));
        assert!(txt.contains("        A.insert(0, 0) = 1.0;\n"));
        assert!(txt.contains("        A.makeCompressed();\n        solver.compute(A);\n"));
        assert!(txt.contains("        b(0) = 9.0;\n"));
        assert!(txt.contains("        V0.pot = solution(0);\n"));
        assert!(txt.contains("        R2.flw = solution(5);\n"));
        assert!(!txt.contains("A(0, 0) = "));
    }

    #[test]
    fn test_matrix_templates_declare_support_values() {
        let mut ctx = SynthesisContext::with_timestep(1e-3).unwrap();
        let system = synthesize(&mut ctx, crate::models::find("series_rc").unwrap());
        let mut substitution = Substitution::new();
        for value in &system.values {
            substitution.insert(value.symbol().clone(), 1.0);
        }
        let solved = system.solve(&GaussJordan::new(), &substitution).unwrap();
        for template in [Template::Dense, Template::Sparse] {
            let txt = generate(&system, &solved, &substitution, &template, "SeriesRc").unwrap();
            assert!(txt.contains("    analog_value_t c0, r0, vin;\n"), "{:?}", template);
            assert!(txt.contains("    analog_value_t ddt0;\n"), "{:?}", template);
            assert!(txt.contains("        ddt0()\n"), "{:?}", template);
            assert!(txt.contains("        ddt0 = "), "{:?}", template);
            assert!(!txt.contains("_system_timestep"), "{:?}", template);
        }
    }

    #[test]
    fn test_user_template() {
        let path = std::env::temp_dir().join(format!("netsynth-{}.jinja", std::process::id()));
        std::fs::write(
            &path,
            "{{ name }}:{% for a in assignments %} {{ a.lhs }}{% endfor %}",
        )
        .unwrap();
        let txt = render(&Template::File(path.clone()));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(txt, "Divider: V0.pot V0.flw R1.pot R1.flw R2.pot R2.flw");
    }

    #[test]
    fn test_missing_template_file() {
        let mut ctx = SynthesisContext::new();
        let system = synthesize(&mut ctx, &divider);
        let solved = SolvedSystem {
            equations: Vec::new(),
            support: Vec::new(),
            auxiliaries: Vec::new(),
        };
        let template = Template::File(PathBuf::from("/nonexistent/netsynth.jinja"));
        let err = generate(&system, &solved, &Substitution::new(), &template, "X").unwrap_err();
        assert!(err.to_string().contains("failed to read template"));
    }

    #[test]
    fn test_template_names() {
        assert_eq!("class".parse::<Template>().unwrap(), Template::Class);
        assert_eq!("dense".parse::<Template>().unwrap(), Template::Dense);
        assert_eq!("sparse".parse::<Template>().unwrap(), Template::Sparse);
        assert_eq!(
            "out.jinja".parse::<Template>().unwrap(),
            Template::File(PathBuf::from("out.jinja"))
        );
    }
}
