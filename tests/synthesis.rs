use std::collections::HashMap;

use netsynth::compiler::{synthesize, BalanceStatus, Session, SolvedSystem, SynthesisError, System};
use netsynth::ir::ast::{eq, mul, Edge, Equation, Expr, Node, Symbol};
use netsynth::ir::context::SynthesisContext;
use netsynth::ir::structural::Diagnostic;
use netsynth::ir::transform::substitute::Substitution;
use netsynth::models::{self, CIRCUITS};
use netsynth::solver::{GaussJordan, SolverError};

fn strings<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Distinct numbers for every parameter, zero history and a unit input.
fn numeric_substitution(ctx: &SynthesisContext, system: &System) -> Substitution {
    let mut substitution = Substitution::new();
    for (i, value) in system.values.iter().enumerate() {
        substitution.insert(value.symbol().clone(), 2.0 + i as f64);
    }
    for aux in &system.auxiliaries {
        substitution.insert(aux.symbol().clone(), 0.0);
    }
    if let Some(input) = ctx.lookup("V0.pot") {
        if !system.unknowns.contains(input) {
            substitution.insert(input.clone(), 1.0);
        }
    }
    substitution
}

fn assert_satisfied(system: &System, solved: &SolvedSystem, substitution: &Substitution) {
    let none = |_: &Symbol| -> Option<f64> { None };
    let solution: HashMap<Symbol, f64> = solved
        .equations
        .iter()
        .map(|e| (e.lhs.as_symbol().unwrap().clone(), e.rhs.eval(&none).unwrap()))
        .collect();
    let env = |s: &Symbol| solution.get(s).copied();
    for equation in system.merged_equations() {
        let residual = substitution.apply(&equation).residual().eval(&env).unwrap();
        assert!(residual.abs() < 1e-6, "{} leaves {}", equation, residual);
    }
}

fn parallel_loads(first: &'static str, second: &'static str) -> impl Fn(&mut Session<'_>) {
    move |s: &mut Session<'_>| {
        let input = Node::new("in");
        let output = Node::new("out");
        let gnd = Node::ground("gnd");
        for edge in [
            Edge::with_alias(&gnd, &input, "V0"),
            Edge::with_alias(&input, &output, "R0"),
            Edge::with_alias(&output, &gnd, first),
            Edge::with_alias(&output, &gnd, second),
        ] {
            s.potential(&edge);
        }
    }
}

#[test]
fn test_series_rc_equations() {
    let mut ctx = SynthesisContext::new();
    let circuit = models::find("series_rc").unwrap();
    let system = synthesize(&mut ctx, circuit);

    assert_eq!(system.tree, ["V0", "C0"]);
    assert_eq!(strings(&system.kvl), ["-C0.pot - V0.pot - R0.pot == 0.0"]);
    assert_eq!(
        strings(&system.kcl),
        ["V0.flw - R0.flw == 0.0", "R0.flw - C0.flw == 0.0"]
    );
    assert_eq!(system.support.len(), 1);
    assert_eq!(system.auxiliaries.len(), 1);
    assert!(system.diagnostics.is_empty());
    assert!(system.check_balance().is_balanced());
}

#[test]
fn test_series_rc_step() {
    let mut ctx = SynthesisContext::with_timestep(1e-3).unwrap();
    let circuit = models::find("series_rc").unwrap();
    let system = synthesize(&mut ctx, circuit);

    let assignments = [
        ("vin".to_string(), 1.0),
        ("r0".to_string(), 1e3),
        ("c0".to_string(), 1e-6),
    ];
    let mut substitution = Substitution::from_assignments(&ctx, &assignments).unwrap();
    substitution.insert(system.auxiliaries[0].symbol().clone(), 0.0);

    let solved = system.solve(&GaussJordan::new(), &substitution).unwrap();
    let none = |_: &Symbol| -> Option<f64> { None };
    let p_c0 = solved.solution("C0.pot").unwrap().eval(&none).unwrap();
    assert!((p_c0 + 0.5).abs() < 1e-9, "C0.pot = {}", p_c0);
    assert_satisfied(&system, &solved, &substitution);
}

#[test]
fn test_parallel_loads_share_one_equation() {
    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, &parallel_loads("R1", "R2"));
    assert_eq!(system.kvl.len(), 2);
    assert_eq!(system.kvl[1].to_string(), "R1.pot == R2.pot");
    assert_eq!(
        system.diagnostics,
        [Diagnostic::LoopNotClosed { edge: "R2".into() }]
    );
}

fn swap_loads(name: &str) -> String {
    name.replace("R1", "#").replace("R2", "R1").replace('#', "R2")
}

#[test]
fn test_parallel_order_picks_representative() {
    let mut ctx = SynthesisContext::new();
    let forward = synthesize(&mut ctx, &parallel_loads("R1", "R2"));
    let mut ctx = SynthesisContext::new();
    let reversed = synthesize(&mut ctx, &parallel_loads("R2", "R1"));

    assert_eq!(forward.tree, ["V0", "R1"]);
    assert_eq!(reversed.tree, ["V0", "R2"]);
    assert_eq!(reversed.kvl[1].to_string(), "R2.pot == R1.pot");
    assert_eq!(
        reversed.diagnostics,
        [Diagnostic::LoopNotClosed { edge: "R1".into() }]
    );

    // Swapping the load names maps one system onto the other, row by row.
    let mut values = HashMap::new();
    for (i, edge) in ["V0", "R0", "R1", "R2"].iter().enumerate() {
        values.insert(format!("{}.pot", edge), 1.5 + i as f64);
        values.insert(format!("{}.flw", edge), 0.25 + 3.0 * i as f64);
    }
    let env = |s: &Symbol| values.get(s.name()).copied();
    let swapped = |s: &Symbol| values.get(&swap_loads(s.name())).copied();

    let rows = |system: &System| -> Vec<Equation> {
        system.kvl.iter().chain(&system.kcl).cloned().collect()
    };
    let forward_rows = rows(&forward);
    let reversed_rows = rows(&reversed);
    assert_eq!(forward_rows.len(), 4);
    assert_eq!(reversed_rows.len(), forward_rows.len());
    for (f, r) in forward_rows.iter().zip(&reversed_rows) {
        let expected = f.residual().eval(&env).unwrap();
        let actual = r.residual().eval(&swapped).unwrap();
        assert!((expected - actual).abs() < 1e-12, "{} against {}", f, r);
    }
    assert_eq!(
        strings(&forward.kvl),
        reversed.kvl.iter().map(|e| swap_loads(&e.to_string())).collect::<Vec<_>>()
    );
}

#[test]
fn test_empty_model() {
    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, &|_: &mut Session<'_>| {});
    assert!(system.merged_equations().is_empty());
    assert!(system.tree.is_empty());
    assert!(system.diagnostics.is_empty());
    assert!(system.check_balance().is_balanced());
}

#[test]
fn test_node_laws_cancel_with_ground() {
    for circuit in CIRCUITS {
        let mut ctx = SynthesisContext::new();
        let system = synthesize(&mut ctx, circuit);
        let mut terms: Vec<Expr> = system.kcl.iter().map(|e| e.residual()).collect();
        for edge in system.topology.edges() {
            let flow = Expr::from(ctx.lookup(&format!("{}.flw", edge.alias())).unwrap());
            if edge.first().is_ground() {
                terms.push(mul(-1.0, flow));
            } else if edge.second().is_ground() {
                terms.push(flow);
            }
        }
        assert!(Expr::sum(terms).is_zero(), "{}", circuit.name);
    }
}

#[test]
fn test_builtin_balance() {
    let expected = [
        ("series_rc", 6),
        ("rc", 9),
        ("rlc", 9),
        ("double_rlc", 14),
        ("diode", 6),
        ("memristor", 6),
    ];
    for (name, unknowns) in expected {
        let mut ctx = SynthesisContext::new();
        let system = synthesize(&mut ctx, models::find(name).unwrap());
        let balance = system.check_balance();
        assert!(balance.is_balanced(), "{}: {}", name, balance);
        assert_eq!(balance.num_unknowns, unknowns, "{}", name);
    }

    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, models::find("not_gate").unwrap());
    let balance = system.check_balance();
    assert_eq!(balance.status, BalanceStatus::OverDetermined);
    assert_eq!(balance.num_unknowns, 19);
    assert_eq!(balance.difference(), 2);
}

#[test]
fn test_rc_structure() {
    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, models::find("rc").unwrap());
    let edges: Vec<&str> = system.topology.edges().iter().map(Edge::alias).collect();
    assert_eq!(edges, ["R0", "C0", "L0", "RL", "V0"]);
    assert_eq!(system.tree, ["C0", "V0"]);
    assert_eq!(
        strings(&system.kvl[1..]),
        ["C0.pot == L0.pot", "C0.pot == RL.pot"]
    );
    assert_eq!(
        system.diagnostics,
        [
            Diagnostic::LoopNotClosed { edge: "L0".into() },
            Diagnostic::LoopNotClosed { edge: "RL".into() },
        ]
    );
    let auxiliaries: Vec<&str> = system.auxiliaries.iter().map(|v| v.name()).collect();
    assert_eq!(auxiliaries.len(), 2);
    assert_ne!(auxiliaries[0], auxiliaries[1]);
}

#[test]
fn test_builtin_solutions() {
    for name in [
        "series_rc",
        "rc",
        "rlc",
        "double_rlc",
        "diode",
        "memristor",
        "not_gate",
    ] {
        let mut ctx = SynthesisContext::with_timestep(1e-3).unwrap();
        let system = synthesize(&mut ctx, models::find(name).unwrap());
        let substitution = numeric_substitution(&ctx, &system);
        let solved = system
            .solve(&GaussJordan::new(), &substitution)
            .unwrap_or_else(|err| panic!("{}: {}", name, err));
        assert_eq!(solved.equations.len(), system.unknowns.len(), "{}", name);
        assert_satisfied(&system, &solved, &substitution);
    }
}

#[test]
fn test_synthesis_is_deterministic() {
    for circuit in CIRCUITS {
        let first = synthesize(&mut SynthesisContext::new(), circuit).to_string();
        let second = synthesize(&mut SynthesisContext::new(), circuit).to_string();
        assert_eq!(first, second, "{}", circuit.name);
    }
}

#[test]
fn test_nonlinear_relation_is_rejected() {
    let model = |s: &mut Session<'_>| {
        let a = Node::new("a");
        let gnd = Node::ground("gnd");
        let v0 = Edge::with_alias(&gnd, &a, "V0");
        let r0 = Edge::with_alias(&a, &gnd, "R0");
        let p_v0 = s.potential(&v0);
        s.equation(eq(&p_v0, 1.0));
        let p_r0 = s.potential(&r0);
        let f_r0 = s.flow(&r0);
        s.equation(eq(&p_r0, mul(&f_r0, &f_r0)));
        let f_v0 = s.flow(&v0);
        s.unknowns([p_v0, f_v0, p_r0, f_r0]);
    };
    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, &model);
    assert!(system.check_balance().is_balanced());
    let err = system
        .solve(&GaussJordan::new(), &Substitution::new())
        .unwrap_err();
    assert!(matches!(
        err,
        SynthesisError::Solver(SolverError::NonLinear { index: 1, .. })
    ));
}

#[test]
fn test_unconstrained_unknown_is_singular() {
    let model = |s: &mut Session<'_>| {
        let a = Node::new("a");
        let gnd = Node::ground("gnd");
        let v0 = Edge::with_alias(&gnd, &a, "V0");
        let p_v0 = s.potential(&v0);
        s.equation(eq(&p_v0, 1.0));
        let f_v0 = s.flow(&v0);
        let x = s.symbol("x");
        s.unknowns([p_v0, f_v0, x]);
    };
    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, &model);
    let err = system
        .solve(&GaussJordan::new(), &Substitution::new())
        .unwrap_err();
    match err {
        SynthesisError::Solver(SolverError::Singular { unknown }) => assert_eq!(unknown, "x"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_system_serializes() {
    let mut ctx = SynthesisContext::new();
    let system = synthesize(&mut ctx, models::find("rc").unwrap());
    let json = serde_json::to_value(&system).unwrap();
    assert_eq!(json["kvl"].as_array().unwrap().len(), 3);
    assert_eq!(json["diagnostics"][0]["kind"], "LoopNotClosed");
    assert_eq!(json["tree"][0], "C0");
}
