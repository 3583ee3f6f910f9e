//! Result-adapting network layer.
//!
//! Dependency flow: `call` → `classifier` → `request_status`, with
//! `connectivity` consulted when a call fails before a response arrives.

pub mod call;
pub mod classifier;
pub mod connectivity;
pub mod pagination;
pub mod request_status;

pub use call::{AdaptedCall, Call, CallAdapter, HttpCall, TransportResult};
pub use classifier::{
    ErrorBodyDecoder, ErrorBodyError, JsonErrorDecoder, RawResponse, TextErrorDecoder,
    TransportFailure,
};
pub use connectivity::{
    ConnectivityMonitor, ConnectivitySubscription, ManualNetwork, NetworkEvents, NetworkPlatform,
    ProbeNetwork, Transport,
};
pub use pagination::Pagination;
pub use request_status::RequestStatus;
