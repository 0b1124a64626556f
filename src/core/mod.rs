// src/core/mod.rs
//! Client core: endpoints, transfer encoding, transport, backend client,
//! session and connectivity

pub mod connectivity;
pub mod endpoints;
pub mod fs_ops;
pub mod multipart;
pub mod service_client;
pub mod session;
pub mod transport;

pub use connectivity::{connectivity, ConnectivityGate, ConnectivityObserver, PathStatus};
pub use endpoints::{Endpoint, Endpoints};
pub use fs_ops::{FsOps, ScopedAccess, SecurityScope, UnrestrictedScope};
pub use multipart::{EncodedForm, MultipartForm, Part};
pub use service_client::{ServiceClient, Timeouts};
pub use session::{ResumeSnapshot, Session};
pub use transport::{ApiRequest, RawResponse, ReqwestTransport, Transport, TransportError};
