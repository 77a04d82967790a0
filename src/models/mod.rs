//! Built-in circuits.
//!
//! Every circuit declares its element relations and unknowns through a
//! [`Session`]; the loop, parallel and node equations come from synthesis.
//! Sources whose potential is not declared as unknown act as free inputs.

use crate::compiler::{AnalogModel, Session};
use crate::ir::ast::{div, eq, mul, neg, sub, Edge, Node};

/// A named, built-in model.
#[derive(Clone, Copy)]
pub struct Circuit {
    pub name: &'static str,
    pub description: &'static str,
    setup: fn(&mut Session<'_>),
}

impl AnalogModel for Circuit {
    fn setup(&self, session: &mut Session<'_>) {
        (self.setup)(session)
    }
}

impl std::fmt::Debug for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Circuit").field("name", &self.name).finish()
    }
}

pub const CIRCUITS: &[Circuit] = &[
    Circuit {
        name: "series_rc",
        description: "Voltage source driving a resistor and a capacitor in series",
        setup: series_rc,
    },
    Circuit {
        name: "rc",
        description: "Resistor feeding a capacitor, an inductor and a load in parallel",
        setup: rc,
    },
    Circuit {
        name: "rlc",
        description: "Series RLC with a resistive load",
        setup: rlc,
    },
    Circuit {
        name: "double_rlc",
        description: "Two cascaded RLC sections",
        setup: double_rlc,
    },
    Circuit {
        name: "diode",
        description: "Linearized diode with a resistive load",
        setup: diode,
    },
    Circuit {
        name: "memristor",
        description: "Memristor modeled as a negative conductance, with a load",
        setup: memristor,
    },
    Circuit {
        name: "not_gate",
        description: "Capacitively coupled inverter with leakage loads",
        setup: not_gate,
    },
];

/// Looks up a built-in circuit by name.
pub fn find(name: &str) -> Option<&'static Circuit> {
    CIRCUITS.iter().find(|c| c.name == name)
}

fn series_rc(s: &mut Session<'_>) {
    let input = Node::new("in");
    let output = Node::new("out");
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &input, "V0");
    let r0 = Edge::with_alias(&input, &output, "R0");
    let c0 = Edge::with_alias(&output, &gnd, "C0");
    let vin = s.value("vin");
    let r = s.value("r0");
    let c = s.value("c0");

    let p_v0 = s.potential(&v0);
    s.equation(eq(&p_v0, &vin));
    let p_r0 = s.potential(&r0);
    let f_r0 = s.flow(&r0);
    s.equation(eq(&p_r0, mul(&r, &f_r0)));
    let f_c0 = s.flow(&c0);
    let p_c0 = s.potential(&c0);
    let rate = s.derivative(&p_c0);
    s.equation(eq(&f_c0, mul(&c, rate)));

    let f_v0 = s.flow(&v0);
    s.unknowns([p_v0, f_v0, p_r0, f_r0, p_c0, f_c0]);
}

fn rc(s: &mut Session<'_>) {
    let input = Node::new("in");
    let output = Node::new("out");
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &input, "V0");
    let r0 = Edge::with_alias(&input, &output, "R0");
    let c0 = Edge::with_alias(&output, &gnd, "C0");
    let l0 = Edge::with_alias(&output, &gnd, "L0");
    let rl = Edge::with_alias(&output, &gnd, "RL");
    let r = s.value("r0");
    let c = s.value("c0");
    let l = s.value("l0");
    let load = s.value("rl");

    let p_r0 = s.potential(&r0);
    let f_r0 = s.flow(&r0);
    s.equation(eq(&p_r0, mul(&r, &f_r0)));
    let f_c0 = s.flow(&c0);
    let p_c0 = s.potential(&c0);
    let rate = s.derivative(&p_c0);
    s.equation(eq(&f_c0, mul(&c, rate)));
    let f_l0 = s.flow(&l0);
    let p_l0 = s.potential(&l0);
    let flux = s.integral(&p_l0);
    s.equation(eq(&f_l0, mul(div(1.0, &l), flux)));
    let p_rl = s.potential(&rl);
    let f_rl = s.flow(&rl);
    s.equation(eq(&p_rl, mul(&load, &f_rl)));

    let f_v0 = s.flow(&v0);
    s.unknowns([f_v0, p_r0, f_r0, p_c0, f_c0, p_l0, f_l0, p_rl, f_rl]);
}

fn rlc(s: &mut Session<'_>) {
    let input = Node::new("in");
    let n1 = Node::new("n1");
    let n2 = Node::new("n2");
    let output = Node::new("out");
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &input, "V0");
    let r0 = Edge::with_alias(&input, &n1, "R0");
    let l0 = Edge::with_alias(&n1, &n2, "L0");
    let c0 = Edge::with_alias(&n2, &output, "C0");
    let rl = Edge::with_alias(&output, &gnd, "RL");
    let r = s.value("r0");
    let l = s.value("l0");
    let c = s.value("c0");
    let load = s.value("rl");

    let p_r0 = s.potential(&r0);
    let f_r0 = s.flow(&r0);
    s.equation(eq(&p_r0, mul(&r, &f_r0)));
    let p_l0 = s.potential(&l0);
    let f_l0 = s.flow(&l0);
    let slope = s.derivative(&f_l0);
    s.equation(eq(&p_l0, mul(&l, slope)));
    let f_c0 = s.flow(&c0);
    let p_c0 = s.potential(&c0);
    let rate = s.derivative(&p_c0);
    s.equation(eq(&f_c0, mul(&c, rate)));
    let p_rl = s.potential(&rl);
    let f_rl = s.flow(&rl);
    s.equation(eq(&p_rl, mul(&load, &f_rl)));

    let f_v0 = s.flow(&v0);
    s.unknowns([f_v0, p_r0, f_r0, p_l0, f_l0, p_c0, f_c0, p_rl, f_rl]);
}

fn double_rlc(s: &mut Session<'_>) {
    let n: Vec<Node> = (0..5).map(|i| Node::new(&format!("n{}", i))).collect();
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &n[0], "V0");
    let r0 = Edge::with_alias(&n[0], &n[1], "R0");
    let l0 = Edge::with_alias(&n[1], &n[2], "L0");
    let c0 = Edge::with_alias(&n[2], &n[3], "C0");
    let r1 = Edge::with_alias(&n[4], &gnd, "R1");
    let l1 = Edge::with_alias(&n[3], &gnd, "L1");
    let c1 = Edge::with_alias(&n[3], &n[4], "C1");
    let vin = s.value("vin");

    let p_v0 = s.potential(&v0);
    s.equation(eq(&p_v0, &vin));

    let mut unknowns = vec![p_v0];
    let f_v0 = s.flow(&v0);
    unknowns.push(f_v0);

    for (resistor, inductor, capacitor, suffix) in [(&r0, &l0, &c0, "0"), (&r1, &l1, &c1, "1")] {
        let r = s.value(&format!("r{}", suffix));
        let l = s.value(&format!("l{}", suffix));
        let c = s.value(&format!("c{}", suffix));

        let p_r = s.potential(resistor);
        let f_r = s.flow(resistor);
        s.equation(eq(&p_r, mul(&r, &f_r)));
        let p_l = s.potential(inductor);
        let f_l = s.flow(inductor);
        let slope = s.derivative(&f_l);
        s.equation(eq(&p_l, mul(&l, slope)));
        let p_c = s.potential(capacitor);
        let f_c = s.flow(capacitor);
        let charge = s.integral(&f_c);
        s.equation(eq(&p_c, mul(div(1.0, &c), charge)));

        unknowns.extend([p_r, f_r, p_l, f_l, p_c, f_c]);
    }
    s.unknowns(unknowns);
}

fn diode(s: &mut Session<'_>) {
    let input = Node::new("in");
    let output = Node::new("out");
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &input, "V0");
    let d0 = Edge::with_alias(&input, &output, "D0");
    let rl = Edge::with_alias(&output, &gnd, "RL");
    let vin = s.value("vin");
    let load = s.value("rl");
    let phi = s.value("phi");
    let rf = s.value("rf");

    let p_v0 = s.potential(&v0);
    s.equation(eq(&p_v0, &vin));
    let f_d0 = s.flow(&d0);
    let p_d0 = s.potential(&d0);
    s.equation(eq(&f_d0, div(sub(&p_d0, &phi), &rf)));
    let p_rl = s.potential(&rl);
    let f_rl = s.flow(&rl);
    s.equation(eq(&p_rl, mul(&f_rl, &load)));

    let f_v0 = s.flow(&v0);
    s.unknowns([p_v0, f_v0, p_d0, f_d0, p_rl, f_rl]);
}

fn memristor(s: &mut Session<'_>) {
    let input = Node::new("in");
    let output = Node::new("out");
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &input, "V0");
    let m0 = Edge::with_alias(&input, &output, "M0");
    let rl = Edge::with_alias(&output, &gnd, "RL");
    let vin = s.value("vin");
    let g = s.value("G");
    let load = s.value("rl");

    let p_v0 = s.potential(&v0);
    s.equation(eq(&p_v0, &vin));
    let f_m0 = s.flow(&m0);
    let p_m0 = s.potential(&m0);
    s.equation(eq(&f_m0, mul(neg(&g), &p_m0)));
    let p_rl = s.potential(&rl);
    let f_rl = s.flow(&rl);
    s.equation(eq(&p_rl, mul(&f_rl, &load)));

    let f_v0 = s.flow(&v0);
    s.unknowns([p_v0, f_v0, p_m0, f_m0, p_rl, f_rl]);
}

fn not_gate(s: &mut Session<'_>) {
    let q = Node::new("q");
    let a = Node::new("a");
    let vdd = Node::new("vdd");
    let vss = Node::new("vss");
    let gnd = Node::ground("gnd");
    let v0 = Edge::with_alias(&gnd, &a, "V0");
    let loads = [
        Edge::with_alias(&q, &gnd, "RL0"),
        Edge::with_alias(&vdd, &gnd, "RL1"),
        Edge::with_alias(&vss, &gnd, "RL2"),
    ];
    let capacitors = [
        (Edge::with_alias(&a, &vdd, "C0"), "c0"),
        (Edge::with_alias(&a, &vss, "C1"), "c1"),
    ];
    let resistors = [
        (Edge::with_alias(&vdd, &q, "R0"), "r0"),
        (Edge::with_alias(&vss, &q, "R1"), "r1"),
    ];
    let output_capacitors = [
        (Edge::with_alias(&vdd, &q, "C2"), "c2"),
        (Edge::with_alias(&vss, &q, "C3"), "c3"),
    ];

    let mut unknowns = Vec::new();
    for (edge, name) in &capacitors {
        let c = s.value(name);
        let f = s.flow(edge);
        let p = s.potential(edge);
        let rate = s.derivative(&p);
        s.equation(eq(&f, mul(rate, &c)));
        unknowns.extend([p, f]);
    }
    for (edge, name) in &resistors {
        let r = s.value(name);
        let f = s.flow(edge);
        let p = s.potential(edge);
        s.equation(eq(&f, div(&p, &r)));
        unknowns.extend([p, f]);
    }
    for (edge, name) in &output_capacitors {
        let c = s.value(name);
        let f = s.flow(edge);
        let p = s.potential(edge);
        let rate = s.derivative(&p);
        s.equation(eq(&f, mul(rate, &c)));
        unknowns.extend([p, f]);
    }
    for edge in &loads {
        let f = s.flow(edge);
        let p = s.potential(edge);
        s.equation(eq(&f, div(&p, 1e9)));
        unknowns.extend([p, f]);
    }
    let f_v0 = s.flow(&v0);
    s.unknown(f_v0);
    s.unknowns(unknowns);
}
