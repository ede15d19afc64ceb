//! Dataminer CLI - inspect reports and render runnable SQL
//!
//! Usage:
//!   dataminer import <query.sql> --output <report.yml> [--caption <text>]
//!   dataminer columns <report.yml>
//!   dataminer tables <report.yml>
//!   dataminer sql <report.yml> [--dialect <dialect>] [--param col:op:v1,v2]...
//!
//! Examples:
//!   dataminer import sales.sql --output sales.yml --caption "Sales"
//!   dataminer sql sales.yml --param region:in:north,south --limit 100
//!   dataminer sql sales.yml --dialect tsql --count

use clap::{Parser, Subcommand, ValueEnum};
use dataminer::config::Settings;
use dataminer::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dataminer")]
#[command(about = "Dataminer - parameterizable SELECT reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a report file from a SQL file
    Import {
        /// Path to the .sql file
        file: PathBuf,

        /// Report file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Report caption
        #[arg(short, long)]
        caption: Option<String>,
    },

    /// List the columns of a report
    Columns {
        /// Path to the report file
        file: PathBuf,
    },

    /// List the tables a report reads from
    Tables {
        /// Path to the report file
        file: PathBuf,
    },

    /// Render runnable SQL for a report
    Sql {
        /// Path to the report file
        file: PathBuf,

        /// SQL dialect to render (defaults to the configured dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Row limit (0 removes it)
        #[arg(short, long)]
        limit: Option<u64>,

        /// Row offset (0 removes it)
        #[arg(long)]
        offset: Option<u64>,

        /// ORDER BY list, e.g. "name DESC, id"
        #[arg(long)]
        order: Option<String>,

        /// Filter as column:operator[:value,value...]
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Drop the report's own WHERE clause before applying filters
        #[arg(long)]
        replace_where: bool,

        /// Render the row-count query instead
        #[arg(long)]
        count: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Tsql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Tsql => Dialect::TSql,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Import {
            file,
            output,
            caption,
        } => cmd_import(&settings, file, output, caption),
        Commands::Columns { file } => cmd_columns(&settings, file),
        Commands::Tables { file } => cmd_tables(&settings, file),
        Commands::Sql {
            file,
            dialect,
            limit,
            offset,
            order,
            params,
            replace_where,
            count,
        } => cmd_sql(
            &settings,
            file,
            SqlArgs {
                dialect: dialect.map(Into::into),
                limit,
                offset,
                order,
                params,
                replace_where,
                count,
            },
        ),
    }
}

fn fail(context: impl Display, err: impl Display) -> ExitCode {
    eprintln!("{}: {}", context, err);
    ExitCode::FAILURE
}

fn load_report(settings: &Settings, file: &Path) -> std::result::Result<Report, String> {
    let path = settings.report_path(file).map_err(|e| e.to_string())?;
    let persistor = YamlPersistor::new(&path).map_err(|e| e.to_string())?;
    let mut report = Report::load(&persistor)
        .map_err(|e| format!("Error loading report '{}': {}", path.display(), e))?;
    report.column_match = settings.report.column_match;
    Ok(report)
}

fn cmd_import(
    settings: &Settings,
    file: PathBuf,
    output: PathBuf,
    caption: Option<String>,
) -> ExitCode {
    let sql = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => return fail(format!("Error reading file '{}'", file.display()), e),
    };

    let mut report = Report::new();
    report.caption = caption;
    report.column_match = settings.report.column_match;
    if let Err(e) = report.set_sql(sql.trim()) {
        return fail("Invalid report SQL", e);
    }

    let path = match settings.report_path(&output) {
        Ok(p) => p,
        Err(e) => return fail("Invalid report path", e),
    };
    let persistor = match YamlPersistor::new(&path) {
        Ok(p) => p,
        Err(e) => return fail("Invalid report path", e),
    };
    if let Err(e) = report.save(&persistor) {
        return fail("Error saving report", e);
    }

    println!(
        "Wrote {} ({} columns)",
        path.display(),
        report.columns().len()
    );
    ExitCode::SUCCESS
}

fn cmd_columns(settings: &Settings, file: PathBuf) -> ExitCode {
    let report = match load_report(settings, &file) {
        Ok(r) => r,
        Err(e) => return fail("Error", e),
    };

    if let Some(caption) = &report.caption {
        println!("{}\n", caption);
    }
    println!(
        "{:>3}  {:<24} {:<24} {:<24} {:<9} {}",
        "#", "NAME", "REFERENCE", "CAPTION", "TYPE", "FLAGS"
    );
    for column in report.ordered_columns() {
        let mut flags = Vec::new();
        if column.hide {
            flags.push("hidden");
        }
        if column.pinned {
            flags.push("pinned");
        }
        if column.groupable {
            flags.push("groupable");
        }
        if column.is_aggregate() {
            flags.push("aggregate");
        }
        println!(
            "{:>3}  {:<24} {:<24} {:<24} {:<9} {}",
            column.sequence_no,
            column.name(),
            column.namespaced_name().unwrap_or("-"),
            column.caption,
            column.data_type,
            flags.join(",")
        );
    }

    let definitions = report.query_parameter_definitions();
    if !definitions.is_empty() {
        println!("\nParameters:");
        for definition in definitions {
            println!("  {}", definition);
        }
    }
    ExitCode::SUCCESS
}

fn cmd_tables(settings: &Settings, file: PathBuf) -> ExitCode {
    let report = match load_report(settings, &file) {
        Ok(r) => r,
        Err(e) => return fail("Error", e),
    };

    match report.tables() {
        Ok(tables) => {
            for table in tables {
                println!("{}", table);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail("Error", e),
    }
}

struct SqlArgs {
    dialect: Option<Dialect>,
    limit: Option<u64>,
    offset: Option<u64>,
    order: Option<String>,
    params: Vec<String>,
    replace_where: bool,
    count: bool,
}

fn cmd_sql(settings: &Settings, file: PathBuf, args: SqlArgs) -> ExitCode {
    let mut report = match load_report(settings, &file) {
        Ok(r) => r,
        Err(e) => return fail("Error", e),
    };

    match render_sql(settings, &mut report, args) {
        Ok(sql) => {
            println!("{}", sql);
            ExitCode::SUCCESS
        }
        Err(e) => fail("Error", e),
    }
}

fn render_sql(settings: &Settings, report: &mut Report, args: SqlArgs) -> dataminer::Result<String> {
    if let Some(limit) = args.limit {
        report.limit = Some(limit);
    } else if report.limit.is_none() {
        report.limit = settings.report.default_limit;
    }
    if args.offset.is_some() {
        report.offset = args.offset;
    }
    if args.order.is_some() {
        report.set_order_by(args.order.as_deref())?;
    }

    let params = args
        .params
        .iter()
        .map(|spec| parse_param(report, spec))
        .collect::<dataminer::Result<Vec<_>>>()?;
    log::info!("rendering with {} parameter(s)", params.len());

    if args.replace_where {
        report.replace_where(&params)?;
    } else {
        report.apply_params(&params)?;
    }

    if args.count {
        return report.count_query();
    }
    let dialect = args.dialect.unwrap_or(settings.render.dialect);
    report.runnable_sql_delimited(dialect)
}

/// Parse `column:operator[:v1,v2,...]`.
fn parse_param(report: &Report, spec: &str) -> dataminer::Result<QueryParameter> {
    let mut parts = spec.splitn(3, ':');
    let (Some(column), Some(operator)) = (parts.next(), parts.next()) else {
        return Err(Error::Argument(format!(
            "Parameter must be column:operator[:values], got {}",
            spec
        )));
    };
    let values: Vec<Value> = parts
        .next()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Value::from)
                .collect()
        })
        .unwrap_or_default();

    let operator_value = OperatorValue::new(operator, values, DataType::String)?;
    match report.parameter_definition(column) {
        Some(definition) => QueryParameter::from_definition(definition, operator_value),
        None => Ok(QueryParameter::new(column, operator_value)),
    }
}
