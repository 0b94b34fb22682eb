use alm_client::{EntityService, HttpTransport};
use alm_entity::{AlmConfig, Entity, EntityKind, QuerySpec};
use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const PASSWORD_VAR: &str = "ALM_PASSWORD";

fn cli() -> Command {
    let collection = Arg::new("collection")
        .required(true)
        .help("REST collection name: releases, runs, test-sets, tests, release-cycles, test-configs or test-folders");
    let fields = Arg::new("fields")
        .long("fields")
        .value_delimiter(',')
        .help("Comma-separated fields to select");
    let links = Arg::new("links")
        .long("links")
        .action(ArgAction::SetTrue)
        .help("Add the reference URL of every entity");
    let conditions = Arg::new("where")
        .long("where")
        .action(ArgAction::Append)
        .value_name("FIELD=EXPR")
        .help("Condition on a field, may be repeated");

    Command::new("alm-fetch")
        .version(alm_client::VERSION)
        .about("Read entities from an ALM REST server")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .default_value("alm.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter when RUST_LOG is not set"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .help("User to log in as, overrides the configuration"),
        )
        .subcommand(Command::new("projects").about("List projects of the configured domain"))
        .subcommand(
            Command::new("count")
                .about("Print the number of matching entities")
                .arg(collection.clone())
                .arg(conditions.clone()),
        )
        .subcommand(
            Command::new("list")
                .about("Print every matching entity as a JSON line")
                .arg(collection.clone())
                .arg(fields.clone())
                .arg(conditions)
                .arg(links.clone()),
        )
        .subcommand(
            Command::new("ids")
                .about("Print entities with the given ids as JSON lines")
                .arg(collection)
                .arg(
                    Arg::new("id")
                        .required(true)
                        .num_args(1..)
                        .help("Entity ids"),
                )
                .arg(fields)
                .arg(links),
        )
        .subcommand(
            Command::new("attachments")
                .about("Download the attachments of a run")
                .arg(Arg::new("run-id").required(true).help("Run id"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File to write the raw bytes to"),
                ),
        )
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn query_from(args: &ArgMatches) -> Result<QuerySpec> {
    let mut query = QuerySpec::new();
    if let Some(fields) = args.try_get_many::<String>("fields").ok().flatten() {
        query = query.with_fields(fields.cloned());
    }
    if let Some(conditions) = args.try_get_many::<String>("where").ok().flatten() {
        for condition in conditions {
            let Some((field, expression)) = condition.split_once('=') else {
                bail!("condition '{condition}' is not FIELD=EXPR");
            };
            query = query.with_condition(field.trim(), expression.trim());
        }
    }
    Ok(query)
}

fn kind_of(args: &ArgMatches) -> Result<EntityKind> {
    let collection = args.get_one::<String>("collection").context("missing collection")?;
    EntityKind::from_collection_name(collection)
        .with_context(|| format!("unknown collection '{collection}'"))
}

fn print_entities(
    service: &EntityService<HttpTransport>,
    entities: &[Entity],
    links: bool,
) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for entity in entities {
        let line = if links {
            let url = service.reference_url(entity)?;
            serde_json::to_string(&serde_json::json!({"entity": entity, "reference": url}))?
        } else {
            serde_json::to_string(entity)?
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .context("missing --config")?;
    let config = AlmConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let level = matches
        .get_one::<String>("log-level")
        .map_or(config.log_level.as_str(), String::as_str);
    init_tracing(level);

    let timeout = config.request_timeout_secs.map(Duration::from_secs);
    let transport = HttpTransport::new(&config.base_url, timeout)?;
    let service = EntityService::from_config(transport, &config)?;

    let Some(user) = matches.get_one::<String>("user").or(config.username.as_ref()) else {
        bail!("no user given, pass --user or set username in the configuration");
    };
    let password = std::env::var(PASSWORD_VAR).ok();
    if !service.login(user, password.as_deref())? {
        bail!("login as '{user}' was not accepted");
    }

    match matches.subcommand() {
        Some(("projects", _)) => {
            for project in service.allowed_projects()? {
                println!("{project}");
            }
        }
        Some(("count", args)) => {
            let kind = kind_of(args)?;
            let total = service.total_count(kind.collection_name(), &query_from(args)?)?;
            println!("{total}");
        }
        Some(("list", args)) => {
            let entities = service.all_of_kind(kind_of(args)?, &query_from(args)?)?;
            print_entities(&service, &entities, args.get_flag("links"))?;
        }
        Some(("ids", args)) => {
            let kind = kind_of(args)?;
            let ids = args.get_many::<String>("id").into_iter().flatten().cloned();
            let fields = query_from(args)?.fields().to_vec();
            let entities = service.entities_by_ids(kind.collection_name(), ids, &fields)?;
            print_entities(&service, &entities, args.get_flag("links"))?;
        }
        Some(("attachments", args)) => {
            let run_id = args.get_one::<String>("run-id").context("missing run id")?;
            let path = args.get_one::<PathBuf>("out").context("missing --out")?;
            let bytes = service.run_attachments(run_id)?;
            std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(run_id = %run_id, bytes = bytes.len(), path = %path.display(), "attachments saved");
        }
        Some((other, _)) => bail!("unknown subcommand '{other}'"),
        None => bail!("no subcommand given"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "alm-fetch failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
