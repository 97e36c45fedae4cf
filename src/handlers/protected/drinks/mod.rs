pub mod create;
pub mod delete;
pub mod detail;
pub mod payload;
pub mod update;

// Re-export handler functions for use in routing
pub use create::post as drinks_post;
pub use delete::delete as drink_delete;
pub use detail::get as drinks_detail_get;
pub use update::patch as drink_patch;
