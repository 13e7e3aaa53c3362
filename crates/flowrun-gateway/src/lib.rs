mod error;
mod routes;
mod server;
mod state;
mod validation;

pub use error::ApiError;
pub use server::{build_router, GatewayServer};
pub use state::AppState;
pub use validation::{ExecuteRequest, ValidationError};
