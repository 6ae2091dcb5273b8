//! Quill CLI - ask a running Quill server to rewrite a question
//!
//! Usage:
//!   quill "How are you?"                 Ask a question
//!   echo "How are you?" | quill          Read the question from stdin
//!   quill --addr http://host:50051 ...   Talk to a remote server

use std::io::{self, Read};

use anyhow::Context;
use clap::Parser;

use quill::{AnswerRequest, AnswerResponse};
use quill_grpc::{GetAnswerRequest, GreeterClient};

/// Ask a Quill server to rewrite a question in the voice of Shakespeare
#[derive(Parser, Debug)]
#[command(name = "quill")]
struct Args {
    /// Server endpoint
    #[arg(long, default_value = "http://[::1]:50051")]
    addr: String,

    /// Question to rewrite (read from stdin if omitted)
    question: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let question = match args.question {
        Some(q) => q,
        None => {
            let mut q = String::new();
            io::stdin()
                .read_to_string(&mut q)
                .context("failed to read stdin")?;
            q
        }
    };

    let mut client = GreeterClient::connect(args.addr.clone())
        .await
        .with_context(|| format!("failed to connect to {}", args.addr))?;

    let request = GetAnswerRequest::from(AnswerRequest { question });
    match client.get_answer(request).await {
        Ok(response) => {
            let AnswerResponse { answer } = response.into_inner().into();
            println!("{}", answer);
            Ok(())
        }
        Err(status) => {
            eprintln!("quill: {}", status.message());
            std::process::exit(1);
        }
    }
}
