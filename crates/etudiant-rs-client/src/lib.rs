//! # etudiant-rs-client
//!
//! REST collection services for the admin client.
//!
//! ## Modules
//!
//! - [`transport`] - The request/response seam and its HTTP implementation
//! - [`session`] - Bearer-token providers for authenticated requests
//! - [`pagination`] - Query criteria and paging metadata
//! - [`service`] - [`CollectionApi`] and its [`CollectionService`] implementation

pub mod pagination;
pub mod service;
pub mod session;
pub mod transport;

pub use pagination::{Page, PageLinks, QueryCriteria};
pub use service::{CollectionApi, CollectionService};
pub use session::{NoSession, SessionProvider, StaticToken};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
