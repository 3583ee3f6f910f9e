//! Deferred network calls.
//!
//! [`HttpCall`] is the raw transport call: it yields a decoded body or a
//! [`TransportFailure`]. [`AdaptedCall`] wraps any such call and yields a
//! [`RequestStatus`] instead, so nothing above it ever sees a transport error.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::classifier::{
    ErrorBodyDecoder, RawResponse, TransportFailure, classify_failure, classify_response,
};
use super::connectivity::ConnectivityMonitor;
use super::request_status::RequestStatus;
use crate::error::CallError;

/// A single deferred request.
///
/// A call runs at most once. Use [`Call::clone_call`] to get a fresh call for
/// the same request.
#[async_trait]
pub trait Call: Send + Sync {
    type Output: Send;

    /// Runs the call and waits for it to finish.
    ///
    /// Returns `None` if the call was canceled before it completed; a
    /// canceled call never produces an output.
    async fn enqueue(&self) -> Option<Self::Output>;

    /// Blocking execution is not supported by any call in this crate.
    fn execute(&self) -> Result<Self::Output, CallError> {
        Err(CallError::SynchronousExecution)
    }

    /// Aborts the call. Safe to call any number of times.
    fn cancel(&self);

    fn is_canceled(&self) -> bool;

    fn is_executed(&self) -> bool;

    /// A new, not yet executed call for the same request.
    fn clone_call(&self) -> Self
    where
        Self: Sized;

    /// Method and URL, for logs.
    fn describe(&self) -> String;
}

/// Transport-level outcome of an [`HttpCall`].
pub type TransportResult<T> = Result<RawResponse<T>, TransportFailure>;

/// Request executed with `reqwest`, success body decoded from JSON into `T`.
pub struct HttpCall<T> {
    client: Client,
    method: Method,
    url: Url,
    executed: Mutex<bool>,
    cancel: CancellationToken,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpCall<T> {
    pub fn new(client: Client, method: Method, url: Url) -> Self {
        Self {
            client,
            method,
            url,
            executed: Mutex::new(false),
            cancel: CancellationToken::new(),
            _marker: PhantomData,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Marks the call as executed. `Ok(false)` means it was canceled first.
    fn start(&self) -> Result<bool, TransportFailure> {
        let mut executed = self
            .executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *executed {
            return Err(TransportFailure::Other("Already executed".to_string()));
        }
        *executed = true;
        Ok(!self.cancel.is_cancelled())
    }
}

async fn send<T: DeserializeOwned>(
    client: &Client,
    method: Method,
    url: Url,
) -> TransportResult<T> {
    let response = client.request(method, url).send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Ok(RawResponse {
            status: status.as_u16(),
            body: None,
            error_body: Some(bytes.to_vec()),
        });
    }

    // 204/205 and other empty 2xx responses carry no body
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes)?)
    };

    Ok(RawResponse {
        status: status.as_u16(),
        body,
        error_body: None,
    })
}

#[async_trait]
impl<T> Call for HttpCall<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = TransportResult<T>;

    async fn enqueue(&self) -> Option<Self::Output> {
        match self.start() {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("--> {} skipped, call was canceled", self.describe());
                return None;
            }
            Err(failure) => return Some(Err(failure)),
        }

        log::debug!("--> {}", self.describe());
        let started = Instant::now();

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                log::debug!(
                    "<-- {} canceled after {}ms",
                    self.describe(),
                    started.elapsed().as_millis()
                );
                None
            }
            outcome = send::<T>(&self.client, self.method.clone(), self.url.clone()) => {
                match &outcome {
                    Ok(response) => log::debug!(
                        "<-- {} {} ({}ms)",
                        response.status,
                        self.url,
                        started.elapsed().as_millis()
                    ),
                    Err(failure) => log::debug!(
                        "<-- {} failed after {}ms: {}",
                        self.url,
                        started.elapsed().as_millis(),
                        failure
                    ),
                }
                Some(outcome)
            }
        }
    }

    fn cancel(&self) {
        let _executed = self
            .executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.cancel.cancel();
    }

    fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn is_executed(&self) -> bool {
        *self
            .executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn clone_call(&self) -> Self {
        HttpCall::new(self.client.clone(), self.method.clone(), self.url.clone())
    }

    fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Wraps a transport call and classifies its outcome into a [`RequestStatus`].
///
/// `T` is the success type, `E` the error body type.
pub struct AdaptedCall<C, E> {
    delegate: C,
    error_decoder: Arc<dyn ErrorBodyDecoder<E>>,
    connectivity: Option<ConnectivityMonitor>,
}

impl<C, E> AdaptedCall<C, E> {
    pub fn new(
        delegate: C,
        error_decoder: Arc<dyn ErrorBodyDecoder<E>>,
        connectivity: Option<ConnectivityMonitor>,
    ) -> Self {
        Self {
            delegate,
            error_decoder,
            connectivity,
        }
    }

    pub fn delegate(&self) -> &C {
        &self.delegate
    }
}

#[async_trait]
impl<C, T, E> Call for AdaptedCall<C, E>
where
    C: Call<Output = TransportResult<T>>,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = RequestStatus<T, E>;

    async fn enqueue(&self) -> Option<Self::Output> {
        let outcome = self.delegate.enqueue().await?;
        let status = match outcome {
            Ok(response) => classify_response(response, self.error_decoder.as_ref()),
            Err(failure) => classify_failure(&failure, self.connectivity.as_ref()),
        };
        Some(status)
    }

    fn cancel(&self) {
        self.delegate.cancel();
    }

    fn is_canceled(&self) -> bool {
        self.delegate.is_canceled()
    }

    fn is_executed(&self) -> bool {
        self.delegate.is_executed()
    }

    fn clone_call(&self) -> Self {
        AdaptedCall {
            delegate: self.delegate.clone_call(),
            error_decoder: Arc::clone(&self.error_decoder),
            connectivity: self.connectivity.clone(),
        }
    }

    fn describe(&self) -> String {
        self.delegate.describe()
    }
}

/// Builds [`AdaptedCall`]s that share one error decoder and one
/// connectivity handle.
pub struct CallAdapter<E> {
    error_decoder: Arc<dyn ErrorBodyDecoder<E>>,
    connectivity: Option<ConnectivityMonitor>,
}

impl<E> Clone for CallAdapter<E> {
    fn clone(&self) -> Self {
        Self {
            error_decoder: Arc::clone(&self.error_decoder),
            connectivity: self.connectivity.clone(),
        }
    }
}

impl<E> CallAdapter<E> {
    pub fn new(
        error_decoder: Arc<dyn ErrorBodyDecoder<E>>,
        connectivity: Option<ConnectivityMonitor>,
    ) -> Self {
        Self {
            error_decoder,
            connectivity,
        }
    }

    pub fn connectivity(&self) -> Option<&ConnectivityMonitor> {
        self.connectivity.as_ref()
    }

    pub fn adapt<C>(&self, call: C) -> AdaptedCall<C, E> {
        AdaptedCall::new(call, Arc::clone(&self.error_decoder), self.connectivity.clone())
    }
}
