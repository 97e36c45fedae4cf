// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod drinks;

pub use drinks::get as drinks_get;
