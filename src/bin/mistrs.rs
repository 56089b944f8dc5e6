//! CLI binary for the mistrs crate.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mistrs::{
    data, subnet, CredentialStore, Credentials, Environment, FetchConfig, MistClient, MistError,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mistrs")]
#[command(author, version, about = "Query the Juniper Mist cloud API")]
struct Cli {
    /// Log every request and page header
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an API token for an environment
    Login {
        /// Environment key (interactive menu when omitted)
        #[arg(short, long, value_parser = parse_environment)]
        env: Option<Environment>,
    },

    /// Show the token owner's privileges
    Whoami {
        #[arg(short, long, value_parser = parse_environment)]
        env: Environment,
    },

    /// GET a single resource
    Get {
        /// API path relative to the environment URL, e.g. `orgs/<id>`
        path: String,

        #[arg(short, long, value_parser = parse_environment)]
        env: Environment,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// GET every page of a list endpoint
    List {
        /// API path relative to the environment URL, e.g. `orgs/<id>/sites`
        path: String,

        #[arg(short, long, value_parser = parse_environment)]
        env: Environment,

        /// Items requested per page
        #[arg(long, default_value_t = mistrs::DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Write the items to this file instead of stdout (xlsx by extension, CSV otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a network into smaller subnets
    Subnet {
        /// Network in CIDR notation, e.g. 10.0.0.0/22
        network: String,

        /// Prefix length of the resulting subnets
        prefix: u8,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Json,
    Table,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("unknown format: {} (expected json, table, or csv)", s)),
        }
    }
}

fn parse_environment(s: &str) -> Result<Environment, String> {
    s.parse().map_err(|e: MistError| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn client_for(env: Environment) -> Result<MistClient, MistError> {
    let creds = CredentialStore::default_location()?.load(env)?;
    MistClient::from_credentials(&creds)
}

fn print_items(items: &[Value], format: OutputFormat) -> Result<(), MistError> {
    match format {
        OutputFormat::Json => data::jprint(&Value::Array(items.to_vec())),
        OutputFormat::Table => data::print_table(items),
        OutputFormat::Csv => print!("{}", data::to_csv_string(items)?),
    }
    Ok(())
}

/// Print `message` and read one trimmed line. End of input is an error.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> Result<String, MistError> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input").into());
    }
    Ok(line.trim().to_string())
}

fn select_environment<R: BufRead, W: Write>(
    store: &CredentialStore,
    input: &mut R,
    out: &mut W,
) -> Result<Environment, MistError> {
    writeln!(out, "\nAvailable environments:")?;
    for (i, env) in Environment::ALL.iter().enumerate() {
        let status = if store.exists(*env) { "✓" } else { "✗" };
        writeln!(out, "{}. {} [{}]", i + 1, env, status)?;
    }

    loop {
        let answer = prompt(input, out, "\nSelect environment number: ")?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=Environment::ALL.len()).contains(&n) => {
                return Ok(Environment::ALL[n - 1]);
            }
            Ok(_) => writeln!(out, "Invalid selection. Please try again.")?,
            Err(_) => writeln!(out, "Invalid input. Please enter a number.")?,
        }
    }
}

fn save_token<R: BufRead, W: Write>(
    store: &CredentialStore,
    env: Environment,
    input: &mut R,
    out: &mut W,
) -> Result<Credentials, MistError> {
    loop {
        match store.save(env, &prompt(input, out, "Enter API token: ")?) {
            Err(MistError::EmptyToken) => {
                writeln!(out, "API token cannot be empty. Please try again.")?
            }
            other => return other,
        }
    }
}

async fn run(cli: Cli) -> Result<(), MistError> {
    match cli.command {
        Commands::Login { env } => {
            let store = CredentialStore::default_location()?;
            let mut input = io::stdin().lock();
            let mut out = io::stdout();
            let env = match env {
                Some(env) => env,
                None => select_environment(&store, &mut input, &mut out)?,
            };

            println!("\nCreating/Updating credentials for {}", env);
            println!("API URL: {}", env.api_url());
            let creds = save_token(&store, env, &mut input, &mut out)?;
            println!("Credentials saved at: {}", store.path_for(env).display());
            println!("API Token: {}", "*".repeat(creds.api_token.len()));
            Ok(())
        }

        Commands::Whoami { env } => {
            let me = client_for(env)?.self_info().await?;
            let privileges = me
                .get("privileges")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            data::print_table(&privileges);
            Ok(())
        }

        Commands::Get { path, env, format } => {
            let value = client_for(env)?.get(&path).await?;
            match value {
                Value::Array(items) => print_items(&items, format),
                single => print_items(&[single], format),
            }
        }

        Commands::List {
            path,
            env,
            page_size,
            no_progress,
            format,
            output,
        } => {
            let config = FetchConfig::default()
                .with_page_size(page_size)
                .with_progress(!no_progress)
                .with_debug(cli.debug);
            let items = client_for(env)?.get_all(&path, &config).await?;

            match output {
                Some(file) => {
                    let is_xlsx = file
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
                    if is_xlsx {
                        data::write_xlsx(&items, &file)?;
                    } else {
                        data::write_csv(&items, &file)?;
                    }
                    eprintln!("Wrote {} items to {}", items.len(), file.display());
                    Ok(())
                }
                None => print_items(&items, format),
            }
        }

        Commands::Subnet {
            network,
            prefix,
            format,
        } => {
            let subnets = subnet::split(&network, prefix)?;
            let rows = subnets
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            print_items(&rows, format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_eof(err: &MistError) -> bool {
        matches!(err, MistError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }

    #[test]
    fn test_prompt_reads_trimmed_line() {
        let mut input = "  abc \n".as_bytes();
        let mut out = Vec::new();
        assert_eq!(prompt(&mut input, &mut out, "> ").unwrap(), "abc");
        assert_eq!(out, b"> ");
    }

    #[test]
    fn test_prompt_fails_at_end_of_input() {
        let mut input = "".as_bytes();
        let err = prompt(&mut input, &mut io::sink(), "> ").unwrap_err();
        assert!(is_eof(&err));
    }

    #[test]
    fn test_select_environment_retries_then_picks() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        let mut input = "0\nabc\n3\n".as_bytes();
        let mut out = Vec::new();

        let env = select_environment(&store, &mut input, &mut out).unwrap();
        assert_eq!(env, Environment::ALL[2]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid selection"));
        assert!(text.contains("Invalid input"));
    }

    #[test]
    fn test_select_environment_stops_at_end_of_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        let err = select_environment(&store, &mut "".as_bytes(), &mut io::sink()).unwrap_err();
        assert!(is_eof(&err));
    }

    #[test]
    fn test_save_token_retries_blank_then_stops_at_end_of_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        let mut input = "\n   \n".as_bytes();
        let mut out = Vec::new();

        let err = save_token(&store, Environment::ALL[0], &mut input, &mut out).unwrap_err();
        assert!(is_eof(&err));
        assert!(!store.exists(Environment::ALL[0]));

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("API token cannot be empty").count(), 2);
    }

    #[test]
    fn test_save_token_after_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path());
        let mut input = "\n tok123 \n".as_bytes();

        let creds = save_token(&store, Environment::ALL[1], &mut input, &mut io::sink()).unwrap();
        assert_eq!(creds.api_token, "tok123");
        assert!(store.exists(Environment::ALL[1]));
    }
}
