mod settings;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use modkit_http_lite::{HttpClient, HttpResponse, RequestBuilder, Transport};
use settings::Settings;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// http-lite - send one request and print the decoded payload
#[derive(Parser)]
#[command(name = "http-lite")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Request method
    #[arg(value_enum, ignore_case = true)]
    method: HttpMethod,

    /// Target URL (`http://` is assumed when no scheme is given)
    url: String,

    /// Request header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// JSON body (POST, PUT and PATCH only); sets `Content-Type`
    #[arg(long, conflicts_with = "data")]
    json: Option<String>,

    /// Raw text body (POST, PUT and PATCH only)
    #[arg(short, long)]
    data: Option<String>,

    /// Follow redirects for this request
    #[arg(short = 'L', long, conflicts_with = "no_location")]
    location: bool,

    /// Do not follow redirects for this request
    #[arg(long)]
    no_location: bool,

    /// Redirect budget override
    #[arg(long)]
    max_redirects: Option<usize>,

    /// Print status and request headers before the payload
    #[arg(short, long)]
    include: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum HttpMethod {
    Get,
    Head,
    Options,
    Delete,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Delete => "DELETE",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }

    fn takes_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Split `Name: value` into its parts.
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header must be `Name: value`, got `{raw}`"))?;
    Ok((name.trim().to_owned(), value.trim().to_owned()))
}

fn apply_options<'a, T: Transport, K>(
    mut request: RequestBuilder<'a, T, K>,
    cli: &Cli,
    headers: Vec<(String, String)>,
) -> RequestBuilder<'a, T, K> {
    request = request.headers(headers);
    if cli.location {
        request = request.allow_redirects(true);
    } else if cli.no_location {
        request = request.allow_redirects(false);
    }
    if let Some(max) = cli.max_redirects {
        request = request.max_redirects(max);
    }
    request
}

fn send(client: &HttpClient, cli: &Cli) -> Result<HttpResponse> {
    if !cli.method.takes_body() && (cli.json.is_some() || cli.data.is_some()) {
        anyhow::bail!("{} requests do not take a body", cli.method.as_str());
    }

    let headers = cli
        .headers
        .iter()
        .map(String::as_str)
        .map(parse_header)
        .collect::<Result<Vec<_>>>()?;

    let bodyless = match cli.method {
        HttpMethod::Get => Some(client.get(&cli.url)),
        HttpMethod::Head => Some(client.head(&cli.url)),
        HttpMethod::Options => Some(client.options(&cli.url)),
        HttpMethod::Delete => Some(client.delete(&cli.url)),
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => None,
    };
    if let Some(request) = bodyless {
        return Ok(apply_options(request, cli, headers).send()?);
    }

    let request = match cli.method {
        HttpMethod::Put => client.put(&cli.url),
        HttpMethod::Patch => client.patch(&cli.url),
        _ => client.post(&cli.url),
    };
    let mut request = apply_options(request, cli, headers);

    if let Some(json) = &cli.json {
        let value: serde_json::Value =
            serde_json::from_str(json).context("--json is not valid JSON")?;
        request = request.json(&value)?;
    } else if let Some(data) = &cli.data {
        request = request.body_string(data.clone());
    }

    Ok(request.send()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let client = settings.to_builder().build()?;
    tracing::info!(method = cli.method.as_str(), url = %cli.url, "sending request");

    let response = send(&client, &cli)?;
    tracing::info!(status = response.status_code(), "request completed");

    if cli.include {
        println!("{response}");
    }
    println!("{}", response.content());
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let (name, value) = parse_header("X-Api-Key:  secret ").unwrap();
        assert_eq!(name, "X-Api-Key");
        assert_eq!(value, "secret");

        let (_, value) = parse_header("Referer: http://example.com/").unwrap();
        assert_eq!(value, "http://example.com/");

        assert!(parse_header("no-colon").is_err());
    }

    #[test]
    fn test_cli_parses_method_and_flags() {
        let cli = Cli::try_parse_from([
            "http-lite",
            "POST",
            "example.com/items",
            "-H",
            "Accept: application/json",
            "--json",
            r#"{"a":1}"#,
            "-L",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.method, HttpMethod::Post);
        assert_eq!(cli.url, "example.com/items");
        assert_eq!(cli.headers, vec!["Accept: application/json".to_owned()]);
        assert!(cli.location);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_json_with_data() {
        let result = Cli::try_parse_from([
            "http-lite", "POST", "example.com", "--json", "{}", "--data", "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_body_on_get_is_rejected() {
        let cli = Cli::try_parse_from(["http-lite", "GET", "example.com", "--data", "x"]).unwrap();
        let client = HttpClient::builder().build().unwrap();
        let err = send(&client, &cli).unwrap_err();
        assert!(err.to_string().contains("do not take a body"));
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let cli = Cli::try_parse_from(["http-lite", "delete", "example.com/x"]).unwrap();
        assert_eq!(cli.method, HttpMethod::Delete);
        assert_eq!(cli.method.as_str(), "DELETE");
    }

    #[test]
    fn test_takes_body() {
        assert!(HttpMethod::Post.takes_body());
        assert!(HttpMethod::Patch.takes_body());
        assert!(!HttpMethod::Head.takes_body());
    }
}
