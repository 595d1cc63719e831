//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use bazaar_http::{ApiClient, ApiRequest, Method};

use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...)
    pub method: String,

    /// Path relative to the API base URL
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Do not retry network and server failures
    #[arg(long)]
    pub no_retry: bool,

    /// Print the response status line before the body
    #[arg(long, short = 'i')]
    pub include_status: bool,
}

fn parse_query(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn parse_method(s: &str) -> Result<Method> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", s))
}

pub async fn run(args: RequestArgs, client: ApiClient) -> Result<()> {
    let method = parse_method(&args.method)?;
    let mut request = ApiRequest::new(method, &args.path);

    for (key, value) in args.query {
        request = request.query(key, value);
    }
    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.json_value(body);
    }
    if args.no_retry {
        request = request.retry(false);
    }

    let response = client
        .execute(request)
        .await
        .with_context(|| format!("{} {} failed", args.method.to_uppercase(), args.path))?;

    if args.include_status {
        eprintln!("{}", response.status().to_string().dimmed());
    }

    let text = response.text().await.context("Failed to read response body")?;
    if text.is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => output::json_pretty(&json)?,
        Err(_) => println!("{}", text),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_is_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Patch").unwrap(), Method::PATCH);
        assert!(parse_method("NOT A METHOD").is_err());
    }

    #[test]
    fn test_parse_query_pair() {
        assert_eq!(
            parse_query("q=rust=fast").unwrap(),
            ("q".to_string(), "rust=fast".to_string())
        );
        assert!(parse_query("missing").is_err());
    }
}
