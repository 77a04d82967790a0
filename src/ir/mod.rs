//! Intermediate representation: expressions, circuit structure, the
//! synthesis context and the passes that operate on them.

pub mod analysis;
pub mod ast;
pub mod context;
pub mod error;
pub mod structural;
pub mod symbol_table;
pub mod transform;
pub mod visitor;
