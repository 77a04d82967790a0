//! Model synthesis pipeline.
//!
//! A model declares its elements through a [`Session`]; [`synthesize`] runs
//! the declaration, the structural analysis and the discretization
//! bookkeeping and returns a [`System`], which can then be checked for balance,
//! solved and handed to the code generator.

pub mod balance;
pub mod error;
pub mod session;
pub mod system;

pub use balance::{BalanceResult, BalanceStatus};
pub use error::SynthesisError;
pub use session::{synthesize, Session};
pub use system::{SolvedSystem, System};

/// Something that can declare its elements and relations into a session.
pub trait AnalogModel {
    fn setup(&self, session: &mut Session<'_>);
}

impl<F> AnalogModel for F
where
    F: Fn(&mut Session<'_>),
{
    fn setup(&self, session: &mut Session<'_>) {
        self(session)
    }
}
