//! Client identity and per-request token signing.

pub mod identity;
pub mod token;

pub use identity::*;
pub use token::*;
