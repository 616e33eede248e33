//! Command-line interface for synoptic scores
//! This binary works on a project folder: it renders the score, lists colophons, searches
//! and replaces across witnesses, and manages the witness files.
//!
//! Usage:
//!   synoptic score `<project>` [--format `<format>`] [--write]     - Render the score
//!   synoptic colophons `<project>`                                - List colophons
//!   synoptic search `<project>` `<query>` [--regex] [--case-sensitive]
//!   synoptic replace `<project>` `<query>` `<replacement>` [--index `<n>`]
//!   synoptic undo `<project>`                                     - Undo the last replace
//!   synoptic init `<dir>` --name `<name>`                           - Create a project
//!   synoptic add `<project>` `<siglum>`                             - Add a witness
//!   synoptic list-formats                                         - List output formats

mod telemetry;

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fmt::Display;
use synoptic_config::{Loader, SynopticConfig};
use synoptic_parser::synoptic::colophon::extract_colophons;
use synoptic_parser::synoptic::formats::{render_colophons, FormatRegistry, RenderOptions};
use synoptic_parser::synoptic::project::{Project, ProjectLayout};
use synoptic_parser::synoptic::search::{self, SearchOptions, SearchQuery};

fn build_cli() -> Command {
    let project_arg = || {
        Arg::new("project")
            .help("Path to the project folder")
            .required(true)
            .index(1)
    };
    let search_flags = |cmd: Command| {
        cmd.arg(
            Arg::new("regex")
                .long("regex")
                .short('r')
                .help("Treat the query as a regular expression")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("case-sensitive")
                .long("case-sensitive")
                .short('s')
                .help("Match case exactly")
                .action(ArgAction::SetTrue),
        )
    };

    Command::new("synoptic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build synoptic scores from manuscript transcriptions")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file layered over the defaults")
                .global(true),
        )
        .subcommand(
            Command::new("score")
                .about("Render the synoptic score")
                .arg(project_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (see list-formats)")
                        .default_value("score-text"),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Write score.txt into the project instead of printing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("colophons")
                .about("List the colophons of every witness")
                .arg(project_arg()),
        )
        .subcommand(search_flags(
            Command::new("search")
                .about("Search every witness")
                .arg(project_arg())
                .arg(Arg::new("query").required(true).index(2)),
        ))
        .subcommand(search_flags(
            Command::new("replace")
                .about("Replace matches in the witness files")
                .arg(project_arg())
                .arg(Arg::new("query").required(true).index(2))
                .arg(Arg::new("replacement").required(true).index(3))
                .arg(
                    Arg::new("index")
                        .long("index")
                        .short('i')
                        .help("Replace only the n-th match as listed by search (0-based)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("undo")
                .about("Undo the last replace")
                .arg(project_arg()),
        )
        .subcommand(
            Command::new("init")
                .about("Create a project folder, or upgrade one with loose witness files")
                .arg(
                    Arg::new("dir")
                        .help("Project folder")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .short('n')
                        .help("Project name")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a witness from the starting template")
                .arg(project_arg())
                .arg(Arg::new("siglum").required(true).index(2)),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
}

fn main() {
    let matches = build_cli().get_matches();

    let config = load_config(matches.get_one::<String>("config"));
    let verbosity = matches.get_count("verbose").max(config.logging.verbosity);
    telemetry::init(verbosity);

    match matches.subcommand() {
        Some(("score", sub)) => handle_score_command(&config, sub),
        Some(("colophons", sub)) => handle_colophons_command(&config, sub),
        Some(("search", sub)) => handle_search_command(&config, sub),
        Some(("replace", sub)) => handle_replace_command(&config, sub),
        Some(("undo", sub)) => handle_undo_command(&config, sub),
        Some(("init", sub)) => handle_init_command(&config, sub),
        Some(("add", sub)) => handle_add_command(&config, sub),
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => unreachable!("clap requires a subcommand"),
    }
}

/// Print the error and exit with status 1.
fn fail(err: impl Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}

fn load_config(path: Option<&String>) -> SynopticConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|e| fail(e))
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("missing argument '{}'", name)))
}

fn open_project(config: &SynopticConfig, matches: &ArgMatches) -> Project {
    let layout = ProjectLayout::from(&config.project);
    Project::open_with(required(matches, "project"), layout).unwrap_or_else(|e| fail(e))
}

/// The query from the command line, with flags falling back to the configured defaults.
fn query_from(config: &SynopticConfig, matches: &ArgMatches) -> SearchQuery {
    let defaults = SearchOptions::from(&config.search);
    SearchQuery::new(required(matches, "query"))
        .regex(matches.get_flag("regex") || defaults.use_regex)
        .case_sensitive(matches.get_flag("case-sensitive") || defaults.case_sensitive)
}

fn handle_score_command(config: &SynopticConfig, matches: &ArgMatches) {
    let project = open_project(config, matches);
    let document = project.document(RenderOptions::from(&config.render));

    if matches.get_flag("write") {
        let written = project.write_score(&document).unwrap_or_else(|e| fail(e));
        if written {
            println!("Wrote {}", project.score_path().display());
        } else {
            println!("Score is empty; nothing written");
        }
        return;
    }

    let format = required(matches, "format");
    let output = FormatRegistry::with_defaults()
        .serialize(&document, format)
        .unwrap_or_else(|e| fail(e));
    print!("{}", output);
}

fn handle_colophons_command(config: &SynopticConfig, matches: &ArgMatches) {
    let project = open_project(config, matches);
    let colophons = extract_colophons(project.witnesses());
    print!("{}", render_colophons(&colophons));
}

fn handle_search_command(config: &SynopticConfig, matches: &ArgMatches) {
    let project = open_project(config, matches);
    let query = query_from(config, matches);
    let results = search::search(project.witnesses(), &query).unwrap_or_else(|e| fail(e));

    let mut index = 0;
    for group in &results.groups {
        println!("{}", group.siglum);
        for m in &group.matches {
            let text = m.highlighted("«", "»");
            println!("  [{}] {}: {}", index, m.line_number, text);
            index += 1;
        }
    }
    println!("{}", results.summary());
}

fn handle_replace_command(config: &SynopticConfig, matches: &ArgMatches) {
    let mut project = open_project(config, matches);
    let query = query_from(config, matches);
    let replacement = required(matches, "replacement");
    let mut log = project.load_replace_log();

    let outcome = match matches.get_one::<usize>("index") {
        Some(&index) => {
            let results = search::search(project.witnesses(), &query).unwrap_or_else(|e| fail(e));
            match results.selection(index) {
                Some(selection) => search::replace_one(
                    project.witnesses_mut(),
                    &mut log,
                    &query,
                    replacement,
                    &selection,
                ),
                None => Ok(Default::default()),
            }
        }
        None => search::replace_all(project.witnesses_mut(), &mut log, &query, replacement),
    }
    .unwrap_or_else(|e| fail(e));

    if outcome.is_noop() {
        println!("Nothing replaced");
        return;
    }
    for id in &outcome.witnesses {
        project.write_witness(id).unwrap_or_else(|e| fail(e));
    }
    project.save_replace_log(&log).unwrap_or_else(|e| fail(e));
    let count = outcome.witnesses.len();
    println!(
        "Replaced {} match{} in {} manuscript{}",
        outcome.replaced,
        if outcome.replaced == 1 { "" } else { "es" },
        count,
        if count == 1 { "" } else { "s" }
    );
}

fn handle_undo_command(config: &SynopticConfig, matches: &ArgMatches) {
    let mut project = open_project(config, matches);
    let mut log = project.load_replace_log();

    let Some(entry) = log.undo(project.witnesses_mut()) else {
        println!("Nothing to undo");
        return;
    };
    for snapshot in &entry.snapshots {
        if project.witnesses().contains(&snapshot.id) {
            project
                .write_witness(&snapshot.id)
                .unwrap_or_else(|e| fail(e));
        }
    }
    project.save_replace_log(&log).unwrap_or_else(|e| fail(e));
    println!("Undid: {}", entry.description);
}

fn handle_init_command(config: &SynopticConfig, matches: &ArgMatches) {
    let layout = ProjectLayout::from(&config.project);
    let dir = required(matches, "dir");
    let name = required(matches, "name");
    let project = Project::init_with(dir, name, layout).unwrap_or_else(|e| fail(e));
    let count = project.witnesses().len();
    println!(
        "Initialised '{}' with {} manuscript{}",
        project.name(),
        count,
        if count == 1 { "" } else { "s" }
    );
}

fn handle_add_command(config: &SynopticConfig, matches: &ArgMatches) {
    let mut project = open_project(config, matches);
    let siglum = required(matches, "siglum");
    let witness = project.add_witness(siglum).unwrap_or_else(|e| fail(e));
    println!("Added {} ({})", witness.siglum, witness.id);
}

fn handle_list_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available formats:\n");
    for (name, description) in registry.describe() {
        println!("  {}", name);
        println!("    {}", description);
        println!();
    }
}
