//! # etudiant-rs-test
//!
//! Testing support for etudiant-rs.
//!
//! - [`RouterTransport`] - Sends client requests through an axum `Router`
//!   in-process, without a socket
//! - [`RecordingTransport`] - Wraps another transport, records every request
//!   and can fail chosen paths
//! - [`LiveServer`] - The reference backend on a random local port
//! - [`fixtures`] - A ready-made in-memory backend with typed services and
//!   sample records
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use etudiant_rs_client::{CollectionApi, QueryCriteria};
//! use etudiant_rs_model::Country;
//! use etudiant_rs_test::fixtures::TestApp;
//!
//! # async fn example() {
//! let app = TestApp::new();
//! app.seed_country("Comores").await.unwrap();
//! let page = app.service::<Country>().query(&QueryCriteria::new()).await.unwrap();
//! assert_eq!(page.items.len(), 1);
//! # }
//! ```

pub mod fixtures;
pub mod live_server;
pub mod recording;
pub mod router_transport;

pub use fixtures::TestApp;
pub use live_server::LiveServer;
pub use recording::{RecordedCall, RecordingTransport};
pub use router_transport::RouterTransport;
