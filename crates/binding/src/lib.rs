//! Contract bindings for external contracts.
//!
//! - ERC20 tokens and their optional metadata extension
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod token;
