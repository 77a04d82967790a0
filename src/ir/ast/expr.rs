//! Symbolic expressions.
//!
//! Expressions are plain trees: numbers, interned symbols, n-ary sums and
//! products, powers and opaque function calls. They are never built directly
//! by callers; the builder functions at the bottom of this module (`add`,
//! `sub`, `mul`, `div`, `pow`, `neg`, `call`, `eq`) route every construction
//! through the canonicalizer in `ir::transform::simplify`, so that constants
//! are folded, like terms are combined and neutral elements disappear.
//!
//! `Display` renders C-like source (`pow(b, e)`, `/`, floating literals) so the
//! same text can be printed for diagnostics and pasted into generated code.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::ir::ast::equation::Equation;
use crate::ir::ast::structure::Value;
use crate::ir::transform::simplify::{canonical_power, canonical_product, canonical_sum};

/// An interned symbol.
///
/// Symbols are handed out by a `SymbolTable`; two symbols are equal only if
/// they were issued by the same interning, so equality and hashing use the id.
#[derive(Clone, Debug)]
pub struct Symbol {
    id: u64,
    name: Arc<str>,
}

impl Symbol {
    pub(crate) fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// A symbolic expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(Symbol),
    /// Sum of two or more terms.
    Add(Vec<Expr>),
    /// Product of two or more factors; a numeric coefficient, if any, comes first.
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    /// Application of a named function. Never simplified.
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn zero() -> Self {
        Expr::Number(0.0)
    }

    pub fn one() -> Self {
        Expr::Number(1.0)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(v) if *v == 0.0)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Sum of an arbitrary number of terms (zero when empty).
    pub fn sum<I>(terms: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        canonical_sum(terms.into_iter().map(Into::into).collect())
    }

    /// Product of an arbitrary number of factors (one when empty).
    pub fn product<I>(factors: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        canonical_product(factors.into_iter().map(Into::into).collect())
    }

    /// True if `symbol` occurs anywhere in the expression.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Expr::Number(_) => false,
            Expr::Symbol(s) => s == symbol,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| e.contains(symbol)),
            Expr::Pow(base, exp) => base.contains(symbol) || exp.contains(symbol),
            Expr::Call { args, .. } => args.iter().any(|e| e.contains(symbol)),
        }
    }

    /// Numerically evaluates the expression.
    ///
    /// Returns `None` if a symbol has no value in `env` or a function is not
    /// one of the elementary functions known to the evaluator.
    pub fn eval<F>(&self, env: &F) -> Option<f64>
    where
        F: Fn(&Symbol) -> Option<f64>,
    {
        match self {
            Expr::Number(v) => Some(*v),
            Expr::Symbol(s) => env(s),
            Expr::Add(terms) => terms.iter().try_fold(0.0, |acc, t| Some(acc + t.eval(env)?)),
            Expr::Mul(factors) => factors
                .iter()
                .try_fold(1.0, |acc, f| Some(acc * f.eval(env)?)),
            Expr::Pow(base, exp) => Some(base.eval(env)?.powf(exp.eval(env)?)),
            Expr::Call { name, args } => {
                if args.len() != 1 {
                    return None;
                }
                let x = args[0].eval(env)?;
                match name.as_str() {
                    "exp" => Some(x.exp()),
                    "log" | "ln" => Some(x.ln()),
                    "sqrt" => Some(x.sqrt()),
                    "abs" => Some(x.abs()),
                    "sin" => Some(x.sin()),
                    "cos" => Some(x.cos()),
                    "tan" => Some(x.tan()),
                    "tanh" => Some(x.tanh()),
                    _ => None,
                }
            }
        }
    }

    /// Splits a term into its sign and magnitude, used when printing sums.
    fn split_sign(&self) -> Option<Expr> {
        match self {
            Expr::Number(v) if *v < 0.0 => Some(Expr::Number(-v)),
            Expr::Mul(factors) => match factors.first() {
                Some(Expr::Number(c)) if *c < 0.0 => {
                    let mut rest = factors.clone();
                    rest[0] = Expr::Number(-c);
                    Some(canonical_product(rest))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Number(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Symbol(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl From<&Value> for Expr {
    fn from(value: &Value) -> Self {
        value.expr()
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        value.expr()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn add(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    canonical_sum(vec![a.into(), b.into()])
}

pub fn sub(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    canonical_sum(vec![a.into(), neg(b)])
}

pub fn mul(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    canonical_product(vec![a.into(), b.into()])
}

pub fn div(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    canonical_product(vec![
        a.into(),
        canonical_power(b.into(), Expr::Number(-1.0)),
    ])
}

pub fn pow(base: impl Into<Expr>, exp: impl Into<Expr>) -> Expr {
    canonical_power(base.into(), exp.into())
}

pub fn neg(a: impl Into<Expr>) -> Expr {
    canonical_product(vec![Expr::Number(-1.0), a.into()])
}

pub fn call<I>(name: &str, args: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    Expr::Call {
        name: name.to_string(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Equation {
    Equation::new(lhs.into(), rhs.into())
}

// =============================================================================
// Printing
// =============================================================================

fn write_number(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        write!(f, "{:.1}", v)
    } else {
        write!(f, "{:?}", v)
    }
}

/// Writes a factor of a product or a power base, parenthesizing sums and
/// negative numbers.
fn write_factor(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    match e {
        Expr::Add(_) => write!(f, "({})", e),
        Expr::Number(v) if *v < 0.0 => write!(f, "({})", e),
        Expr::Mul(_) => write!(f, "({})", e),
        _ => write!(f, "{}", e),
    }
}

fn write_product(f: &mut fmt::Formatter<'_>, factors: &[Expr]) -> fmt::Result {
    let mut coefficient = None;
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (i, factor) in factors.iter().enumerate() {
        match factor {
            Expr::Number(v) if i == 0 => coefficient = Some(*v),
            Expr::Pow(base, exp) => match exp.as_number() {
                Some(e) if e < 0.0 => {
                    denominator.push(canonical_power((**base).clone(), Expr::Number(-e)))
                }
                _ => numerator.push(factor.clone()),
            },
            _ => numerator.push(factor.clone()),
        }
    }

    let mut wrote = false;
    match coefficient {
        Some(c) if c == -1.0 && !numerator.is_empty() => f.write_str("-")?,
        Some(c) if c != 1.0 || numerator.is_empty() => {
            write_number(f, c)?;
            wrote = true;
        }
        _ => {}
    }
    for factor in &numerator {
        if wrote {
            f.write_str("*")?;
        }
        write_factor(f, factor)?;
        wrote = true;
    }
    if !wrote {
        f.write_str("1.0")?;
    }
    match denominator.len() {
        0 => Ok(()),
        1 => {
            f.write_str("/")?;
            write_factor(f, &denominator[0])
        }
        _ => {
            f.write_str("/(")?;
            for (i, factor) in denominator.iter().enumerate() {
                if i > 0 {
                    f.write_str("*")?;
                }
                write_factor(f, factor)?;
            }
            f.write_str(")")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(v) => write_number(f, *v),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    match (i, term.split_sign()) {
                        (0, _) => write!(f, "{}", term)?,
                        (_, Some(magnitude)) => {
                            f.write_str(" - ")?;
                            match magnitude {
                                Expr::Add(_) => write!(f, "({})", magnitude)?,
                                _ => write!(f, "{}", magnitude)?,
                            }
                        }
                        (_, None) => write!(f, " + {}", term)?,
                    }
                }
                Ok(())
            }
            Expr::Mul(factors) => write_product(f, factors),
            Expr::Pow(base, exp) => match exp.as_number() {
                Some(e) if e < 0.0 => write_product(f, std::slice::from_ref(self)),
                _ => write!(f, "pow({}, {})", base, exp),
            },
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
