//! gRPC server implementation for the Greeter service.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

use quill::{AnswerError, AnswerRequest, AnswerResponse, Answerer, CompletionClient};

use crate::proto::{self, GetAnswerRequest, GetAnswerResponse};

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen socket could not be opened
    #[error("failed to listen on {addr}: {source}")]
    Listen {
        /// Address we tried to bind
        addr: SocketAddr,
        /// Underlying bind error
        source: std::io::Error,
    },
    /// The transport failed while serving
    #[error("failed to serve: {0}")]
    Serve(#[from] tonic::transport::Error),
}

impl From<GetAnswerRequest> for AnswerRequest {
    fn from(req: GetAnswerRequest) -> Self {
        Self {
            question: req.question,
        }
    }
}

impl From<AnswerRequest> for GetAnswerRequest {
    fn from(req: AnswerRequest) -> Self {
        Self {
            question: req.question,
        }
    }
}

impl From<GetAnswerResponse> for AnswerResponse {
    fn from(resp: GetAnswerResponse) -> Self {
        Self {
            answer: resp.answer,
        }
    }
}

impl From<AnswerResponse> for GetAnswerResponse {
    fn from(resp: AnswerResponse) -> Self {
        Self {
            answer: resp.answer,
        }
    }
}

/// Map a handler error onto the wire. Only the fixed message is sent.
fn to_status(err: AnswerError) -> Status {
    match err {
        AnswerError::GenerationFailed => Status::internal(err.to_string()),
    }
}

/// Open the listen socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Listen { addr, source })
}

/// The Greeter gRPC service implementation.
pub struct AnswerService<C: ?Sized> {
    answerer: Answerer<C>,
}

impl<C: ?Sized> std::fmt::Debug for AnswerService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerService")
            .field("answerer", &self.answerer)
            .finish()
    }
}

impl<C: ?Sized> Clone for AnswerService<C> {
    fn clone(&self) -> Self {
        Self {
            answerer: self.answerer.clone(),
        }
    }
}

impl<C: CompletionClient + ?Sized + 'static> AnswerService<C> {
    /// Create a new service around a shared answerer.
    pub fn new(answerer: Answerer<C>) -> Self {
        Self { answerer }
    }

    /// Wrap the service for registration with a tonic router.
    pub fn into_server(self) -> proto::greeter_server::GreeterServer<Self> {
        proto::greeter_server::GreeterServer::new(self)
    }
}

#[tonic::async_trait]
impl<C: CompletionClient + ?Sized + 'static> proto::greeter_server::Greeter for AnswerService<C> {
    async fn get_answer(
        &self,
        request: Request<GetAnswerRequest>,
    ) -> Result<Response<GetAnswerResponse>, Status> {
        let remote = request.remote_addr();
        tracing::debug!(?remote, "GetAnswer");

        let req = AnswerRequest::from(request.into_inner());
        let resp = self.answerer.get_answer(req).await.map_err(to_status)?;

        Ok(Response::new(resp.into()))
    }
}

/// Server configuration and runner.
pub struct AnswerServer<C: ?Sized> {
    service: AnswerService<C>,
}

impl<C: ?Sized> std::fmt::Debug for AnswerServer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerServer")
            .field("service", &self.service)
            .finish()
    }
}

impl<C: CompletionClient + ?Sized + 'static> AnswerServer<C> {
    /// Create a new server that answers with the given answerer.
    pub fn new(answerer: Answerer<C>) -> Self {
        Self {
            service: AnswerService::new(answerer),
        }
    }

    /// Serve on `listener` until SIGINT or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `signal` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), ServerError>
    where
        F: std::future::Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("server listening at {}", addr);
        }

        tonic::transport::Server::builder()
            .add_service(self.service.into_server())
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
            .await?;

        tracing::info!("gRPC server shut down");
        Ok(())
    }
}

/// Resolves on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!("Cannot listen for SIGINT: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    tracing::info!(signal = received, "Shutting down gracefully");
}
