pub mod auth;
pub mod response;

pub use auth::{
    extract_jwt_from_headers, Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, Permission,
    PostDrinks,
};
pub use response::{ApiResponse, ApiResult};
