//! Various helpers used in the ZKsync stack.

pub mod bytecode;
mod convert;

pub use convert::*;
