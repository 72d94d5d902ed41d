mod error;
mod server;
mod state;

pub use error::ApiError;
pub use server::run_server;
