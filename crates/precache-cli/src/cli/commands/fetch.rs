use std::io::Write;

use anyhow::Context;
use precache::{CacheFirstWorker, Lifecycle, Method, Request};

use crate::cli::args::{FetchArgs, GlobalArgs};
use crate::exit_codes::SUCCESS;

pub async fn run(global: &GlobalArgs, args: FetchArgs) -> anyhow::Result<i32> {
    let config = super::load_config(global)?;
    let worker = CacheFirstWorker::from_config(&config).await?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method: {}", args.method))?;
    let mut request = Request::new(method, config.resolve(&args.target)?);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    if let Some(data) = args.data {
        request = request.with_body(data);
    }

    let outcome = worker.on_fetch(request).await?;
    let response = &outcome.response;
    eprintln!(
        "{} {} ({}, {} bytes)",
        response.status,
        response.url,
        outcome.source,
        response.body.len()
    );

    let mut head = Vec::new();
    if args.include {
        writeln!(head, "HTTP {}", response.status)?;
        for (name, value) in &response.headers {
            write!(head, "{}: ", name)?;
            head.extend_from_slice(value);
            writeln!(head)?;
        }
        writeln!(head)?;
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &response.body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            std::io::stdout().write_all(&head)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&head)?;
            stdout.write_all(&response.body)?;
            stdout.flush()?;
        }
    }

    Ok(SUCCESS)
}

/// Split `"Name: value"` into its parts.
fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header must be \"Name: value\", got {:?}", raw))?;
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "header name is empty in {:?}", raw);
    Ok((name.to_string(), value.trim().to_string()))
}
