//! Quill gRPC Server
//!
//! Exposes a single unary method, `Greeter/GetAnswer`, which rewrites the
//! caller's question in the voice of Shakespeare using a chat completion API.
//!
//! # Example Flow
//!
//! ```text
//! Client                        Server                      Completion API
//! │                               │                               │
//! │ GetAnswerRequest{question}    │                               │
//! │ ─────────────────────────────>│                               │
//! │                               │ POST /chat/completions        │
//! │                               │ ─────────────────────────────>│
//! │                               │                               │
//! │                               │ choices[0].message.content    │
//! │                               │<───────────────────────────── │
//! │ GetAnswerResponse{answer}     │                               │
//! │<───────────────────────────── │                               │
//! ```
//!
//! Upstream failures reach the client only as `INTERNAL` with a fixed
//! message; the cause is logged on the server.

pub mod proto {
    #![allow(missing_docs)]
    #![allow(clippy::doc_markdown)]
    tonic::include_proto!("quill.v1");
}

mod server;

pub use server::{AnswerServer, AnswerService, ServerError, bind};

// Re-export proto types for convenience
pub use proto::{
    GetAnswerRequest, GetAnswerResponse, greeter_client::GreeterClient,
    greeter_server::GreeterServer,
};
