// handlers/protected/mod.rs - Handlers gated by a bearer token and a permission scope
//
// Each handler takes an `Authorized<P>` extractor naming its scope. Token
// verification and the scope check run there, before the body is read.

pub mod drinks;

pub use drinks::*;
