#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use couch_export::cli::{Cli, Command, ExportArgs, ReplicateArgs};
use couch_export::connection::{CouchClient, ReplicationRequest};
use couch_export::document::{PatchPolicy, PatchSpec};
use couch_export::export::run_export;
use couch_export::state::{ConfigManager, Credentials};

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ConfigManager::new(&cli.config_dir);
    config.load_dotenv()?;
    let credentials = config.load_credentials()?;

    let command = cli.command.unwrap_or_else(|| Command::Export(ExportArgs::default()));
    let database = if needs_database(&command) {
        Some(select_database(cli.database.as_deref(), &credentials)?.to_string())
    } else {
        None
    };

    let mut client = CouchClient::new(credentials).context("Failed to create client")?;
    client.with_session(|client| execute(client, &config, command, database.as_deref()))
}

fn execute(
    client: &mut CouchClient,
    config: &ConfigManager,
    command: Command,
    database: Option<&str>,
) -> Result<()> {
    if let Some(database) = database {
        client
            .use_database(database)
            .with_context(|| format!("Failed to open database {database}"))?;
    }

    match command {
        Command::Export(args) => export(client, config, args)?,
        Command::Get { id } => {
            let doc = client.get_document(&id)?.with_context(|| format!("Document {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Update { id, patch, strict } => {
            let raw: serde_json::Value =
                serde_json::from_str(&patch).context("Patch must be valid JSON")?;
            let policy = if strict { PatchPolicy::Strict } else { PatchPolicy::Lenient };
            let spec = PatchSpec::from_value_with(&raw, policy)?;
            let saved = client.update_document(&id, &spec)?;
            println!("{} {}", saved.id, saved.rev);
        }
        Command::Delete { id } => {
            let deleted = client.delete_document(&id)?;
            println!("{} {}", deleted.id, deleted.rev);
        }
        Command::CleanupView { design, view, blocks } => {
            let report = client.cleanup_view(&design, &view, blocks)?;
            println!(
                "{} docs deleted in {} chunks ({} failed)",
                report.written(),
                report.outcomes.len(),
                report.failed().len()
            );
            if !report.all_succeeded() {
                anyhow::bail!("some chunks failed: {:?}", report.failed());
            }
        }
        Command::Replicate(args) => replicate(client, args)?,
        Command::ListDbs => {
            for name in client.list_databases()? {
                println!("{name}");
            }
        }
        Command::CreateDb { name } => client.create_database(&name)?,
        Command::DestroyDb { name } => client.destroy_database(&name)?,
    }
    Ok(())
}

fn needs_database(command: &Command) -> bool {
    !matches!(
        command,
        Command::Replicate(_) | Command::ListDbs | Command::CreateDb { .. } | Command::DestroyDb { .. }
    )
}

fn select_database<'a>(flag: Option<&'a str>, credentials: &'a Credentials) -> Result<&'a str> {
    match flag {
        Some(name) => Ok(name),
        None => credentials.require_database(),
    }
}

fn export(client: &CouchClient, config: &ConfigManager, args: ExportArgs) -> Result<()> {
    let queries = config.load_queries(&args.queries)?;
    let mut settings = config.load_export_settings()?;
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(output) = args.output {
        settings.filename_template = output;
    }
    if let Some(sheet) = args.sheet {
        settings.sheet_name = sheet;
    }

    let summary = run_export(client, &queries, &settings).context("Export failed")?;
    println!(
        "{} documents written to {} ({})",
        summary.documents,
        summary.path.display(),
        summary.format.label()
    );
    Ok(())
}

fn replicate(client: &CouchClient, args: ReplicateArgs) -> Result<()> {
    let mut request = ReplicationRequest::new(args.source, args.target);
    request.create_target = args.create_target;
    request.poll_interval = Duration::from_secs(args.poll_interval.max(1));
    request.timeout = Duration::from_secs(args.timeout);

    let outcome = client.replicate(&request)?;
    match outcome.docs_written {
        Some(written) => println!("Replication {} completed ({written} docs written)", outcome.id),
        None => println!("Replication {} completed", outcome.id),
    }
    Ok(())
}
