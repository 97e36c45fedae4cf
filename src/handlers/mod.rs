// handlers/mod.rs - Public (no token) and protected (token + scope) handlers
pub mod protected;
pub mod public;
