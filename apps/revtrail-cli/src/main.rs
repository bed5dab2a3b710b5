use clap::{Parser, Subcommand};
use revtrail_common::{BasicRecord, FieldMap};
use revtrail_core::{ActorContext, TrailConfig};
use revtrail_store::{register, AuditHooks, MemoryStore, MutationOptions, TrackedModel};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "revtrail-cli", about = "CLI demo for the revtrail audit engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a create/update/destroy sequence and print the audit trail
    Trail {
        /// Actor recorded on the revisions
        #[arg(short, long, default_value = "demo-user")]
        actor: String,
    },
    /// Bulk-create records; each becomes its own first revision
    Bulk {
        /// Number of records to create
        #[arg(short, long, default_value = "3")]
        count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Trail { actor } => run_trail(&actor),
        Commands::Bulk { count } => run_bulk(count),
    }
}

fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn run_trail(actor: &str) -> anyhow::Result<()> {
    let config = TrailConfig {
        enable_revision_change: true,
        ..TrailConfig::default()
    };
    let (hooks, schema) = register(&TrackedModel::new("Article"), config, MemoryStore::new());
    println!(
        "registered: {} -> {} (changes: {})",
        schema.association.from_model,
        schema.revision_table,
        schema.change_table.as_deref().unwrap_or("disabled"),
    );

    let ctx = ActorContext::new().with_actor(actor);
    let opts = MutationOptions::new();
    let mut record = BasicRecord::new(
        "Article",
        1,
        fields(&[("title", json!("draft")), ("body", json!("hello"))]),
    );

    // create
    let pending = hooks.before_create(&mut record, &opts)?;
    let mut tx = hooks.store().begin();
    hooks.after_create(&record, &opts, Some(&ctx), pending, &mut tx)?;
    hooks.store().commit(tx);

    // update
    record.begin_mutation(fields(&[("title", json!("published"))]));
    let pending = hooks.before_update(&mut record, &opts)?;
    let mut tx = hooks.store().begin();
    hooks.after_update(&record, &opts, Some(&ctx), pending, &mut tx)?;
    hooks.store().commit(tx);

    // destroy
    record.begin_mutation(FieldMap::new());
    let pending = hooks.before_destroy(&mut record, &opts)?;
    let mut tx = hooks.store().begin();
    hooks.after_destroy(&record, &opts, Some(&ctx), pending, &mut tx)?;
    hooks.store().commit(tx);

    print_trail(&hooks);
    Ok(())
}

fn run_bulk(count: usize) -> anyhow::Result<()> {
    let (hooks, _) = register(
        &TrackedModel::new("Article"),
        TrailConfig::default(),
        MemoryStore::new(),
    );

    let mut records: Vec<BasicRecord> = (0..count)
        .map(|i| {
            BasicRecord::new(
                "Article",
                i as i64 + 1,
                fields(&[("title", json!(format!("article-{i}")))]),
            )
        })
        .collect();

    let opts = MutationOptions::new().with_actor("importer");
    hooks.before_bulk_create(&mut records, &opts);
    let mut tx = hooks.store().begin();
    hooks.after_bulk_create(&records, &opts, None, &mut tx)?;
    hooks.store().commit(tx);

    print_trail(&hooks);
    Ok(())
}

fn print_trail(hooks: &AuditHooks<MemoryStore>) {
    for revision in hooks.store().revisions() {
        println!(
            "#{} {} {} rev={} by {} doc={}",
            revision.id,
            revision.model,
            revision.operation,
            revision.revision,
            revision.actor_id.as_deref().unwrap_or("-"),
            revision
                .document
                .as_json()
                .map(ToString::to_string)
                .unwrap_or_default(),
        );
        for change in hooks.store().changes_for(revision.id) {
            println!("    ~ {}: {}", change.path, serde_json::to_string(&change.diff).unwrap_or_default());
        }
    }
}
