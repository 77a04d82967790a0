//! Traversal of expressions and equations.
//!
//! `Visitor` walks a tree immutably; `MutVisitor` walks it in place. Both call
//! `enter_*` before and `exit_*` after the children of a node, so a
//! `MutVisitor` that rewrites in `exit_expr` sees already rewritten children.

use crate::ir::ast::{Equation, Expr, Symbol};

pub trait Visitor {
    fn enter_equation(&mut self, _node: &Equation) {}
    fn exit_equation(&mut self, _node: &Equation) {}
    fn enter_expr(&mut self, _node: &Expr) {}
    fn exit_expr(&mut self, _node: &Expr) {}
    fn enter_symbol(&mut self, _node: &Symbol) {}
    fn enter_call(&mut self, _name: &str, _args: &[Expr]) {}
}

pub trait Visitable {
    fn accept<V: Visitor>(&self, visitor: &mut V);
}

impl Visitable for Expr {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.enter_expr(self);
        match self {
            Expr::Number(_) => {}
            Expr::Symbol(s) => visitor.enter_symbol(s),
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items {
                    item.accept(visitor);
                }
            }
            Expr::Pow(base, exp) => {
                base.accept(visitor);
                exp.accept(visitor);
            }
            Expr::Call { name, args } => {
                visitor.enter_call(name, args);
                for arg in args {
                    arg.accept(visitor);
                }
            }
        }
        visitor.exit_expr(self);
    }
}

impl Visitable for Equation {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.enter_equation(self);
        self.lhs.accept(visitor);
        self.rhs.accept(visitor);
        visitor.exit_equation(self);
    }
}

pub trait MutVisitor {
    fn enter_equation(&mut self, _node: &mut Equation) {}
    fn exit_equation(&mut self, _node: &mut Equation) {}
    fn enter_expr(&mut self, _node: &mut Expr) {}
    fn exit_expr(&mut self, _node: &mut Expr) {}
}

pub trait MutVisitable {
    fn accept_mut<V: MutVisitor>(&mut self, visitor: &mut V);
}

impl MutVisitable for Expr {
    fn accept_mut<V: MutVisitor>(&mut self, visitor: &mut V) {
        visitor.enter_expr(self);
        match self {
            Expr::Number(_) | Expr::Symbol(_) => {}
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items.iter_mut() {
                    item.accept_mut(visitor);
                }
            }
            Expr::Pow(base, exp) => {
                base.accept_mut(visitor);
                exp.accept_mut(visitor);
            }
            Expr::Call { args, .. } => {
                for arg in args.iter_mut() {
                    arg.accept_mut(visitor);
                }
            }
        }
        visitor.exit_expr(self);
    }
}

impl MutVisitable for Equation {
    fn accept_mut<V: MutVisitor>(&mut self, visitor: &mut V) {
        visitor.enter_equation(self);
        self.lhs.accept_mut(visitor);
        self.rhs.accept_mut(visitor);
        visitor.exit_equation(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ast::{add, call, eq, mul};

    #[derive(Default)]
    struct SymbolCounter {
        symbols: usize,
        calls: usize,
    }

    impl Visitor for SymbolCounter {
        fn enter_symbol(&mut self, _node: &Symbol) {
            self.symbols += 1;
        }

        fn enter_call(&mut self, _name: &str, _args: &[Expr]) {
            self.calls += 1;
        }
    }

    #[test]
    fn test_visits_both_sides() {
        let x = Symbol::new(1, "x");
        let y = Symbol::new(2, "y");
        let equation = eq(add(&x, mul(2.0, &y)), call("exp", [&x]));
        let mut counter = SymbolCounter::default();
        equation.accept(&mut counter);
        assert_eq!(counter.symbols, 3);
        assert_eq!(counter.calls, 1);
    }
}
