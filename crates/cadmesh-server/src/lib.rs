// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # cadmesh-server
//!
//! HTTP front end converting uploaded STEP and IGES files to triangle meshes.
//!
//! ```no_run
//! # async fn run() -> std::io::Result<()> {
//! use cadmesh_server::{app, ServerConfig};
//!
//! let config = ServerConfig::from_env();
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, app(config)).await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::{app, router, AppState};
