#![cfg(test)]
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod api_server;
pub mod stub_target;

pub use api_server::TestApiServer;
pub use stub_target::{refused_url, StubTarget};
