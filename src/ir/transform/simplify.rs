//! Light canonicalization of expressions.
//!
//! Every expression builder funnels through one of the three functions here.
//! They assume their inputs are already canonical and guarantee that:
//!
//! - sums and products are flat (no `Add` directly inside `Add`, no `Mul`
//!   inside `Mul`) and have at least two operands;
//! - numeric constants are folded, with a product's coefficient stored first
//!   and a sum's constant stored last;
//! - like terms (`2*x + 3*x`) and equal bases (`x * x^-1`) are combined;
//! - a numeric coefficient multiplying a sum is distributed into it.
//!
//! Nothing here expands products of sums or rewrites function calls.

use crate::ir::ast::Expr;

fn split_coefficient(term: Expr) -> (f64, Expr) {
    match term {
        Expr::Mul(mut factors) => match factors.first() {
            Some(Expr::Number(c)) => {
                let c = *c;
                factors.remove(0);
                let rest = if factors.len() == 1 {
                    factors.pop().unwrap_or_else(Expr::one)
                } else {
                    Expr::Mul(factors)
                };
                (c, rest)
            }
            _ => (1.0, Expr::Mul(factors)),
        },
        other => (1.0, other),
    }
}

fn collect_terms(term: Expr, constant: &mut f64, groups: &mut Vec<(Expr, f64)>) {
    match term {
        Expr::Add(terms) => {
            for t in terms {
                collect_terms(t, constant, groups);
            }
        }
        Expr::Number(v) => *constant += v,
        other => {
            let (c, rest) = split_coefficient(other);
            if let Expr::Add(inner) = rest {
                for t in inner {
                    collect_terms(canonical_product(vec![Expr::Number(c), t]), constant, groups);
                }
                return;
            }
            match groups.iter_mut().find(|(r, _)| *r == rest) {
                Some(group) => group.1 += c,
                None => groups.push((rest, c)),
            }
        }
    }
}

/// Builds the canonical sum of `terms`.
pub fn canonical_sum(terms: Vec<Expr>) -> Expr {
    let mut constant = 0.0;
    let mut groups: Vec<(Expr, f64)> = Vec::new();
    for term in terms {
        collect_terms(term, &mut constant, &mut groups);
    }

    let mut out: Vec<Expr> = groups
        .into_iter()
        .filter(|(_, c)| *c != 0.0)
        .map(|(rest, c)| {
            if c == 1.0 {
                rest
            } else {
                canonical_product(vec![Expr::Number(c), rest])
            }
        })
        .collect();
    if constant != 0.0 {
        out.push(Expr::Number(constant));
    }
    match out.len() {
        0 => Expr::zero(),
        1 => out.pop().unwrap_or_else(Expr::zero),
        _ => Expr::Add(out),
    }
}

fn collect_factors(factor: Expr, coefficient: &mut f64, bases: &mut Vec<(Expr, Expr)>) {
    match factor {
        Expr::Mul(factors) => {
            for f in factors {
                collect_factors(f, coefficient, bases);
            }
        }
        Expr::Number(v) => *coefficient *= v,
        Expr::Pow(base, exp) => push_base(*base, *exp, bases),
        other => push_base(other, Expr::one(), bases),
    }
}

fn push_base(base: Expr, exp: Expr, bases: &mut Vec<(Expr, Expr)>) {
    match bases.iter_mut().find(|(b, _)| *b == base) {
        Some(entry) => {
            let previous = std::mem::replace(&mut entry.1, Expr::zero());
            entry.1 = canonical_sum(vec![previous, exp]);
        }
        None => bases.push((base, exp)),
    }
}

/// Builds the canonical product of `factors`.
pub fn canonical_product(factors: Vec<Expr>) -> Expr {
    let mut coefficient = 1.0;
    let mut bases: Vec<(Expr, Expr)> = Vec::new();
    for factor in factors {
        collect_factors(factor, &mut coefficient, &mut bases);
    }
    if coefficient == 0.0 {
        return Expr::zero();
    }

    let mut out = Vec::with_capacity(bases.len() + 1);
    for (base, exp) in bases {
        match canonical_power(base, exp) {
            Expr::Number(v) => coefficient *= v,
            Expr::Mul(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    if coefficient == 0.0 {
        return Expr::zero();
    }

    // A coefficient times a single sum is distributed.
    if coefficient != 1.0 && out.len() == 1 {
        if let Expr::Add(terms) = &out[0] {
            let terms = terms.clone();
            return canonical_sum(
                terms
                    .into_iter()
                    .map(|t| canonical_product(vec![Expr::Number(coefficient), t]))
                    .collect(),
            );
        }
    }

    match (out.len(), coefficient == 1.0) {
        (0, _) => Expr::Number(coefficient),
        (1, true) => out.pop().unwrap_or_else(Expr::one),
        (_, true) => Expr::Mul(out),
        (_, false) => {
            out.insert(0, Expr::Number(coefficient));
            Expr::Mul(out)
        }
    }
}

/// Builds the canonical power `base^exp`.
pub fn canonical_power(base: Expr, exp: Expr) -> Expr {
    match (base, exp) {
        (_, Expr::Number(e)) if e == 0.0 => Expr::one(),
        (base, Expr::Number(e)) if e == 1.0 => base,
        (Expr::Number(b), Expr::Number(e)) => {
            let value = b.powf(e);
            if value.is_finite() {
                Expr::Number(value)
            } else {
                Expr::Pow(Box::new(Expr::Number(b)), Box::new(Expr::Number(e)))
            }
        }
        (Expr::Number(b), _) if b == 1.0 => Expr::one(),
        (Expr::Pow(inner, inner_exp), Expr::Number(e)) if e.fract() == 0.0 => {
            match *inner_exp {
                Expr::Number(ie) => canonical_power(*inner, Expr::Number(ie * e)),
                other => Expr::Pow(
                    Box::new(Expr::Pow(inner, Box::new(other))),
                    Box::new(Expr::Number(e)),
                ),
            }
        }
        (Expr::Mul(factors), Expr::Number(e)) if e.fract() == 0.0 => canonical_product(
            factors
                .into_iter()
                .map(|f| canonical_power(f, Expr::Number(e)))
                .collect(),
        ),
        (base, exp) => Expr::Pow(Box::new(base), Box::new(exp)),
    }
}
