//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::config::{Settings, DEFAULT_ADDRESS, DEFAULT_COLLECTION};
use crate::CliError;

#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(about = "Create, fill, query, update, and delete a person collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Where the backend is and which collection to use.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Backend addresses, comma-separated; the first one is used
    #[arg(
        long,
        env = "DOCSTORE_ADDRESSES",
        value_delimiter = ',',
        default_value = DEFAULT_ADDRESS,
        global = true
    )]
    pub addresses: Vec<String>,

    /// Basic-auth username
    #[arg(long, env = "DOCSTORE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "DOCSTORE_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Collection to operate on
    #[arg(long, env = "DOCSTORE_COLLECTION", default_value = DEFAULT_COLLECTION, global = true)]
    pub collection: String,

    /// Abandon any single backend call after this many seconds
    #[arg(long, env = "DOCSTORE_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Transport timeout for each HTTP request, in seconds
    #[arg(long, env = "DOCSTORE_REQUEST_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,
}

impl From<ConnectionArgs> for Settings {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            addresses: args.addresses,
            username: args.username,
            password: args.password,
            collection: args.collection,
            timeout_secs: args.timeout_secs,
            request_timeout_secs: args.request_timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the backend is reachable and print its version
    Ping,
    /// Create the collection with the person schema
    CreateCollection {
        /// Analyzer for the name field, e.g. ik_max_word (must be installed on the backend)
        #[arg(long)]
        analyzer: Option<String>,
        /// Number of replicas
        #[arg(long, default_value = "0")]
        replicas: u32,
    },
    /// Delete the collection and every record in it
    DeleteCollection {
        /// Confirm the collection should be deleted
        #[arg(long)]
        yes: bool,
    },
    /// Insert or replace one person
    Insert { id: String, name: String },
    /// Insert or replace several people given as id=name pairs
    InsertBatch {
        #[arg(required = true, value_parser = parse_person)]
        people: Vec<(String, String)>,
    },
    /// Look up a person by id
    Get { id: String },
    /// Full-text search a field
    Search {
        /// Text to match
        text: String,
        /// Field to search
        #[arg(long, default_value = "name")]
        field: String,
    },
    /// Print every person in the collection
    List {
        /// Records fetched per round trip
        #[arg(long, default_value = "100")]
        page_size: usize,
    },
    /// Fully replace a person
    Replace { id: String, name: String },
    /// Change selected fields of an existing record, given as field=value pairs
    Patch {
        id: String,
        #[arg(long = "set", required = true, value_parser = parse_field_change)]
        changes: Vec<(String, Value)>,
    },
    /// Delete a person by id
    Delete { id: String },
    /// Run the create, insert, read, patch, delete walkthrough
    Demo {
        /// Delete the collection first if it already exists
        #[arg(long)]
        reset: bool,
    },
}

/// Split `key=value` at the first `=`.
fn split_assignment(input: &str) -> Result<(&str, &str), CliError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| CliError::invalid_argument(format!("expected key=value, got '{}'", input)))?;
    if key.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "missing key in '{}'",
            input
        )));
    }
    Ok((key, value))
}

/// Parse an `id=name` pair.
pub fn parse_person(input: &str) -> Result<(String, String), CliError> {
    let (id, name) = split_assignment(input)?;
    Ok((id.to_string(), name.to_string()))
}

/// Parse a `field=value` pair; the value is read as JSON when it parses,
/// otherwise as a plain string.
pub fn parse_field_change(input: &str) -> Result<(String, Value), CliError> {
    let (field, raw) = split_assignment(input)?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_person() {
        assert_eq!(
            parse_person("p1002=李四").unwrap(),
            ("p1002".to_string(), "李四".to_string())
        );
        assert!(parse_person("p1002").is_err());
        assert!(parse_person("=李四").is_err());
    }

    #[test]
    fn test_parse_person_keeps_later_equals() {
        let (id, name) = parse_person("p1=a=b").unwrap();

        assert_eq!(id, "p1");
        assert_eq!(name, "a=b");
    }

    #[test]
    fn test_parse_field_change_json_or_string() {
        assert_eq!(
            parse_field_change("age=30").unwrap(),
            ("age".to_string(), serde_json::json!(30))
        );
        assert_eq!(
            parse_field_change("name=张三三").unwrap(),
            ("name".to_string(), serde_json::json!("张三三"))
        );
        assert_eq!(
            parse_field_change("name=\"42\"").unwrap(),
            ("name".to_string(), serde_json::json!("42"))
        );
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "docstore",
            "--collection",
            "staff",
            "patch",
            "p1001",
            "--set",
            "name=张三三",
        ])
        .unwrap();

        assert_eq!(cli.connection.collection, "staff");
        match cli.command {
            Command::Patch { id, changes } => {
                assert_eq!(id, "p1001");
                assert_eq!(changes, vec![("name".to_string(), serde_json::json!("张三三"))]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_splits_addresses() {
        let cli = Cli::try_parse_from([
            "docstore",
            "--addresses",
            "http://es-1:9200,http://es-2:9200",
            "ping",
        ])
        .unwrap();

        assert_eq!(cli.connection.addresses.len(), 2);
    }

    #[test]
    fn test_cli_request_timeout_reaches_connection_config() {
        let cli = Cli::try_parse_from(["docstore", "--request-timeout-secs", "5", "ping"]).unwrap();

        let config = Settings::from(cli.connection).connection_config().unwrap();

        assert_eq!(config.request_timeout, Some(std::time::Duration::from_secs(5)));
    }

    #[test]
    fn test_cli_insert_batch_requires_people() {
        assert!(Cli::try_parse_from(["docstore", "insert-batch"]).is_err());

        let cli = Cli::try_parse_from(["docstore", "insert-batch", "p1002=李四", "p1003=王五"]).unwrap();
        match cli.command {
            Command::InsertBatch { people } => assert_eq!(people.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
