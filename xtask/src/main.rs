// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations CI runs (rustfmt, clippy, docs, machete,
//! build, per-crate tests, README sync) and adds `verify-migrations`, which
//! applies the embedded `SQLite` migrations to a scratch database and checks
//! the resulting schema.
//!
//! - `cargo xtask ci` runs the full pipeline
//! - `cargo xtask verify-migrations` checks the migrated schema on its own

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Everything CI gates on: formatting, clippy, docs, unused deps, build,
    /// tests, README sync and the migration check
    CI,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    Clippy {
        /// Apply clippy's suggested fixes to the working tree
        #[arg(long)]
        fix: bool,
    },

    /// Run rustfmt over the workspace
    #[command(visible_alias = "fmt")]
    Format {
        /// Fail instead of rewriting files
        #[arg(long)]
        check: bool,
    },

    /// Build the docs with warnings denied
    #[command(visible_alias = "d")]
    Docs,

    /// Look for dependencies a crate declares but never uses
    #[command(visible_alias = "m")]
    Machete,

    /// Check README.md still carries the core crate docs
    #[command(visible_alias = "cr")]
    CheckReadme,

    /// Run each workspace crate's tests
    #[command(visible_alias = "t")]
    Test,

    /// Write an lcov report to target/lcov.info
    #[command(visible_alias = "cov")]
    Coverage,

    /// Apply the migrations to a scratch database and check the schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => run_cargo(&["build", "--workspace", "--all-targets"]),
            Self::Clippy { fix } => clippy(fix),
            Self::Format { check } => rustfmt(check),
            Self::Docs => docs(),
            Self::Machete => machete(),
            Self::CheckReadme => {
                run_cargo(&["rdme", "--workspace-project", "rotaplan", "--check"])
            }
            Self::Test => test(),
            Self::Coverage => run_cargo(&[
                "llvm-cov",
                "--workspace",
                "--lcov",
                "--output-path",
                "target/lcov.info",
            ]),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn ci() -> Result<()> {
    rustfmt(true)?;
    clippy(false)?;
    docs()?;
    machete()?;
    Command::Build.run()?;
    test()?;
    Command::CheckReadme.run()?;
    verify_migrations()
}

fn clippy(fix: bool) -> Result<()> {
    let mut args: Vec<&str> = vec!["clippy", "--workspace", "--all-targets"];
    if fix {
        args.extend(["--fix", "--allow-dirty", "--allow-staged"]);
    }
    args.extend(["--", "-D", "warnings"]);
    run_cargo(&args)
}

fn rustfmt(check: bool) -> Result<()> {
    if check {
        run_cargo(&["fmt", "--all", "--check"])
    } else {
        run_cargo(&["fmt", "--all"])
    }
}

fn docs() -> Result<()> {
    cmd!("cargo", "doc", "--workspace", "--no-deps")
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    Ok(())
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Tests run crate by crate so a failure names its crate
fn test() -> Result<()> {
    let meta = MetadataCommand::new()
        .no_deps()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        tracing::info!("testing {}", package.name);
        run_cargo(&["test", "--package", &package.name])
            .wrap_err(format!("tests failed in {}", package.name))?;
    }
    Ok(())
}

fn run_cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args.iter().copied()).run_with_trace()?;
    Ok(())
}

/// Tables every migrated database must carry.
const EXPECTED_TABLES: [&str; 10] = [
    "assignments",
    "availability_windows",
    "date_blocks",
    "group_preferences",
    "organizations",
    "schedule_events",
    "session_groups",
    "sessions",
    "staff_directory",
    "swap_requests",
];

/// Unique indexes the store relies on to reject double-booking and a second
/// outstanding swap: `(table, index, columns)`.
const INVARIANT_INDEXES: [(&str, &str, &[&str]); 2] = [
    (
        "assignments",
        "idx_assignments_session_staff",
        &["session_id", "staff_id"],
    ),
    (
        "swap_requests",
        "idx_swap_requests_one_outstanding",
        &["assignment_id"],
    ),
];

/// Verify the embedded migrations produce the schema the store expects
///
/// ## What This Command Does
///
/// 1. Opens an in-memory `SQLite` database with foreign keys enabled
/// 2. Applies the migrations under `crates/persistence/migrations`
/// 3. Introspects the resulting tables, columns, keys, and indexes
/// 4. Fails if a table is missing or a unique index the store depends on
///    is absent, not unique, or covers the wrong columns
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Applying migrations to a scratch database");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply migrations: {}", e))?;

    tracing::info!("Introspecting migrated schema");
    let schema = introspect_sqlite_schema(&mut conn)?;

    check_schema(&schema)?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
    unique: bool,
    partial: bool,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
        #[diesel(sql_type = Integer)]
        partial: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            // Primary key autoindexes carry no information beyond `pk`
            if idx.name.starts_with("sqlite_autoindex_") {
                continue;
            }

            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            table_info.indexes.insert(Index {
                name: idx.name,
                columns: index_columns.into_iter().map(|c| c.name).collect(),
                unique: idx.unique != 0,
                partial: idx.partial != 0,
            });
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Check the migrated schema against the tables and indexes the store needs
fn check_schema(schema: &Schema) -> Result<()> {
    let mut errors = Vec::new();

    for table in EXPECTED_TABLES {
        match schema.tables.get(table) {
            None => errors.push(format!("  - Table '{table}' is missing")),
            Some(info) if info.primary_keys.is_empty() => {
                errors.push(format!("  - Table '{table}' has no primary key"));
            }
            Some(info) => {
                for (name, column) in &info.columns {
                    if name.ends_with("_id") && column.normalized_type != "integer" {
                        errors.push(format!(
                            "  - Column '{table}.{name}' is {}, expected integer",
                            column.normalized_type
                        ));
                    }
                }
                tracing::debug!(
                    "{table}: {} columns ({} nullable), {} foreign keys, {} indexes",
                    info.columns.len(),
                    info.columns.values().filter(|c| c.nullable).count(),
                    info.foreign_keys.len(),
                    info.indexes.len()
                );
            }
        }
    }

    for (table, index_name, columns) in INVARIANT_INDEXES {
        let Some(info) = schema.tables.get(table) else {
            continue;
        };

        let Some(index) = info.indexes.iter().find(|i| i.name == index_name) else {
            errors.push(format!("  - Index '{index_name}' on '{table}' is missing"));
            continue;
        };

        if !index.unique {
            errors.push(format!("  - Index '{index_name}' on '{table}' is not unique"));
        }

        if index.columns != columns {
            errors.push(format!(
                "  - Index '{index_name}' on '{table}' covers {:?}, expected {columns:?}",
                index.columns
            ));
        }
    }

    // One outstanding swap per assignment, not one swap ever
    if let Some(index) = schema
        .tables
        .get("swap_requests")
        .and_then(|t| {
            t.indexes
                .iter()
                .find(|i| i.name == "idx_swap_requests_one_outstanding")
        })
        .filter(|i| !i.partial)
    {
        errors.push(format!(
            "  - Index '{}' must be partial on status = 'REQUESTED'",
            index.name
        ));
    }

    let assignment_fk = ForeignKey {
        from_column: "session_id".to_string(),
        to_table: "sessions".to_string(),
        to_column: "session_id".to_string(),
    };
    if schema
        .tables
        .get("assignments")
        .is_some_and(|t| !t.foreign_keys.contains(&assignment_fk))
    {
        errors.push("  - assignments.session_id does not reference sessions".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(color_eyre::eyre::eyre!(
            "❌ Migration verification FAILED\n{}",
            errors.join("\n")
        ))
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
