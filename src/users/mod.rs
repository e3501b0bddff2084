// User management module
// Profile CRUD, the admin listing, role administration, and profile images

pub mod models;
pub mod error;
pub mod repository;
pub mod service;
pub mod handlers;

pub use models::*;
pub use error::*;
pub use repository::*;
pub use service::*;
pub use handlers::*;
