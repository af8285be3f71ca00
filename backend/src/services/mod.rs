pub mod auth;
pub mod pickup_point;
pub mod reception;

pub use auth::{AuthError, AuthService, RefreshedTokens};
pub use pickup_point::PickupPointService;
pub use reception::ReceptionService;
