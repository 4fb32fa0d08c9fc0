pub mod common;

mod server_routes;
