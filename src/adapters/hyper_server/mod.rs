mod adapter;
mod routes;
mod server;

pub use adapter::{Body, HyperApiAdapter};
pub use routes::Route;
pub use server::serve;
