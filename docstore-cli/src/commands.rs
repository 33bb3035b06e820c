//! Subcommand implementations.

use futures::TryStreamExt;
use serde_json::Map;
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::Dependencies;
use crate::CliError;
use docstore_repository::{
    BackendInfo, BatchOperationSummary, CollectionSchema, DocumentStoreClient, DocumentStoreError,
    RequestContext,
};
use docstore_shared::{FieldChanges, Person};

/// Run one subcommand against the configured collection.
pub async fn run(command: Command, deps: &Dependencies, ctx: &RequestContext) -> Result<(), CliError> {
    let client = &deps.client;
    let collection = deps.collection.as_str();

    match command {
        Command::Ping => {
            let info = client.ping(ctx).await?;
            println!("{}", format_backend_info(&info));
        }
        Command::CreateCollection { analyzer, replicas } => {
            let schema = match analyzer {
                Some(analyzer) => CollectionSchema::person_with_analyzer(analyzer),
                None => CollectionSchema::person(),
            }
            .replicas(replicas);
            client.create_collection(ctx, collection, &schema).await?;
            println!("Collection '{}' created", collection);
        }
        Command::DeleteCollection { yes } => {
            if !yes {
                return Err(CliError::NotConfirmed(format!(
                    "delete collection '{}'",
                    collection
                )));
            }
            client.delete_collection(ctx, collection).await?;
            println!("Collection '{}' deleted with all of its records", collection);
        }
        Command::Insert { id, name } => {
            client
                .upsert_record(ctx, collection, &Person::new(id.as_str(), name))
                .await?;
            println!("Inserted {}", id);
        }
        Command::InsertBatch { people } => {
            let people: Vec<Person> = people
                .into_iter()
                .map(|(id, name)| Person::new(id, name))
                .collect();
            let summary = client.upsert_records_batch(ctx, collection, &people).await?;
            for line in format_summary(&summary) {
                println!("{}", line);
            }
            check_summary(&summary)?;
        }
        Command::Get { id } => {
            let person: Option<Person> = client.get_record(ctx, collection, &id).await?;
            println!("{}", format_lookup(&id, person.as_ref()));
        }
        Command::Search { text, field } => {
            let people: Vec<Person> = client.search_by_text(ctx, collection, &field, &text).await?;
            println!("Found {} result(s):", people.len());
            for person in &people {
                println!("{}", format_person(person));
            }
        }
        Command::List { page_size } => {
            let mut records = Box::pin(client.list_all::<Person>(ctx, collection, page_size));
            let mut count = 0;
            while let Some(person) = records.try_next().await? {
                println!("{}", format_person(&person));
                count += 1;
            }
            println!("{} record(s) in total", count);
        }
        Command::Replace { id, name } => {
            client
                .replace_record(ctx, collection, &Person::new(id.as_str(), name))
                .await?;
            println!("Replaced {}", id);
        }
        Command::Patch { id, changes } => {
            let changes = FieldChanges::from(changes.into_iter().collect::<Map<_, _>>());
            client.patch_record(ctx, collection, &id, &changes).await?;
            println!("Patched {} ({} field(s))", id, changes.len());
        }
        Command::Delete { id } => {
            client.delete_record(ctx, collection, &id).await?;
            println!("Deleted {}", id);
        }
        Command::Demo { reset } => demo(client, ctx, collection, reset).await?,
    }
    Ok(())
}

/// Walk a person through its whole lifecycle, printing each step.
async fn demo(
    client: &DocumentStoreClient,
    ctx: &RequestContext,
    collection: &str,
    reset: bool,
) -> Result<(), CliError> {
    if reset {
        match client.delete_collection(ctx, collection).await {
            Ok(()) => info!(collection = %collection, "Removed existing collection"),
            Err(DocumentStoreError::CollectionNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    client
        .create_collection(ctx, collection, &CollectionSchema::person())
        .await?;
    println!("1. created collection '{}'", collection);

    let person = Person::new("p1001", "张三");
    client.upsert_record(ctx, collection, &person).await?;
    println!("2. inserted {}", format_person(&person));

    let batch = vec![
        Person::new("p1002", "李四"),
        Person::new("p1003", "王五"),
        Person::new("p1004", "赵六"),
    ];
    let summary = client.upsert_records_batch(ctx, collection, &batch).await?;
    println!("3. batch inserted {}/{}", summary.succeeded, summary.total);

    let fetched: Option<Person> = client.get_record(ctx, collection, "p1001").await?;
    println!("4. {}", format_lookup("p1001", fetched.as_ref()));

    let matches: Vec<Person> = client.search_by_text(ctx, collection, "name", "张").await?;
    println!("5. search '张' found {} result(s)", matches.len());
    for person in &matches {
        println!("   {}", format_person(person));
    }

    client
        .patch_record(ctx, collection, "p1001", &FieldChanges::new().set("name", "张三三"))
        .await?;
    let fetched: Option<Person> = client.get_record(ctx, collection, "p1001").await?;
    println!("6. after patch: {}", format_lookup("p1001", fetched.as_ref()));

    client.delete_record(ctx, collection, "p1001").await?;
    let fetched: Option<Person> = client.get_record(ctx, collection, "p1001").await?;
    println!("7. after delete: {}", format_lookup("p1001", fetched.as_ref()));

    match client.delete_record(ctx, collection, "p1001").await {
        Err(e) if e.is_record_not_found() => println!("8. second delete reports: {}", e),
        Err(e) => return Err(e.into()),
        Ok(()) => warn!("Second delete unexpectedly succeeded"),
    }
    Ok(())
}

pub fn format_backend_info(info: &BackendInfo) -> String {
    let mut line = format!(
        "Connected: {} {}",
        info.distribution.as_deref().unwrap_or("backend"),
        info.version
    );
    if let Some(cluster) = &info.cluster_name {
        line.push_str(&format!(" (cluster {})", cluster));
    }
    line
}

pub fn format_person(person: &Person) -> String {
    format!("ID={}, Name={}", person.id, person.name)
}

pub fn format_lookup(id: &str, person: Option<&Person>) -> String {
    match person {
        Some(person) => format!("found {}", format_person(person)),
        None => format!("no record with ID={}", id),
    }
}

/// One line for the totals, then one per failed record.
pub fn format_summary(summary: &BatchOperationSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Batch: {} total, {} succeeded, {} failed",
        summary.total, summary.succeeded, summary.failed
    )];
    for failure in summary.failures() {
        let (kind, reason) = match &failure.error {
            Some(e) => (e.kind(), e.to_string()),
            None => ("unknown", "unknown error".to_string()),
        };
        lines.push(format!(
            "  #{} (ID={:?}) failed [{}]: {}",
            failure.position, failure.id, kind, reason
        ));
    }
    lines
}

/// A batch with any failed record is a failed command.
pub fn check_summary(summary: &BatchOperationSummary) -> Result<(), CliError> {
    if summary.all_succeeded() {
        return Ok(());
    }
    Err(CliError::BatchFailed {
        failed: summary.failed,
        total: summary.total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore_repository::BatchOperationResult;

    #[test]
    fn test_format_lookup() {
        let person = Person::new("p1001", "张三");

        assert_eq!(
            format_lookup("p1001", Some(&person)),
            "found ID=p1001, Name=张三"
        );
        assert_eq!(format_lookup("p9", None), "no record with ID=p9");
    }

    #[test]
    fn test_format_backend_info() {
        let info = BackendInfo {
            version: "2.11.0".to_string(),
            distribution: Some("opensearch".to_string()),
            cluster_name: Some("docker-cluster".to_string()),
            node_name: None,
        };

        assert_eq!(
            format_backend_info(&info),
            "Connected: opensearch 2.11.0 (cluster docker-cluster)"
        );
    }

    #[test]
    fn test_format_summary_lists_failures() {
        let summary = BatchOperationSummary::from_results(vec![
            BatchOperationResult {
                id: "p1002".to_string(),
                position: 0,
                success: true,
                error: None,
            },
            BatchOperationResult {
                id: "".to_string(),
                position: 1,
                success: false,
                error: Some(DocumentStoreError::validation("record id is required")),
            },
        ]);

        let lines = format_summary(&summary);

        assert_eq!(lines[0], "Batch: 2 total, 1 succeeded, 1 failed");
        assert_eq!(
            lines[1],
            "  #1 (ID=\"\") failed [validation]: Validation error: record id is required"
        );
        assert!(matches!(
            check_summary(&summary),
            Err(CliError::BatchFailed { failed: 1, total: 2 })
        ));
    }

    #[test]
    fn test_check_summary_accepts_clean_batch() {
        let summary = BatchOperationSummary::from_results(vec![BatchOperationResult {
            id: "p1002".to_string(),
            position: 0,
            success: true,
            error: None,
        }]);

        assert!(check_summary(&summary).is_ok());
        assert!(check_summary(&BatchOperationSummary::default()).is_ok());
    }
}
