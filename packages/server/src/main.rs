#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Site planner API server binary.
//!
//! Pass `--interactive` to be prompted for the bind address and port.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if std::env::args().skip(1).any(|arg| arg == "--interactive") {
        site_planner_server::interactive::run().await
    } else {
        site_planner_server::run_server().await
    }
}
