// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::info;
use std::io::Write;
use std::path::PathBuf;

use vademecum::config::Config;
use vademecum::runtime_paths::RuntimePaths;
use vademecum::taxonomy::importer::load_import_file;
use vademecum::taxonomy::store::{GuidelineFilter, TaxonomyStore};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if matches!(parsed_args.command, Command::Help) {
        print!("{}", help_text());
        return 0;
    }

    let runtime_paths = match RuntimePaths::from_root(&parsed_args.runtime_root) {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("❌ Failed to prepare runtime directory: {}", error);
            return 1;
        }
    };

    let config = match Config::load_or_default(&runtime_paths.config_file) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };

    // Configure logging with a stable format
    let logger_outcome = env_logger::Builder::from_default_env()
        .filter_level(config.log_level_filter())
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
    if let Err(error) = logger_outcome {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return 1;
    }

    let store = match TaxonomyStore::open(&runtime_paths.state_sys_dir) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("❌ Failed to open taxonomy state: {}", error);
            return 1;
        }
    };
    info!("Taxonomy state loaded from {}", runtime_paths.root.display());

    match parsed_args.command {
        Command::Help => 0,
        Command::Import(path) => run_import(&store, &config, &path),
        Command::CategoryList => run_category_list(&store),
        Command::GuidelineList => run_guideline_list(&store),
        Command::GuidelineShow(slug) => run_guideline_show(&store, &slug),
        Command::TagList => run_tag_list(&store),
    }
}

fn run_import(store: &TaxonomyStore, config: &Config, path: &PathBuf) -> i32 {
    let batch = match load_import_file(path) {
        Ok(batch) => batch,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };
    match store.import_batch(&batch, config.import.max_entries) {
        Ok(summary) => {
            println!(
                "Imported {} categories, {} guidelines, {} references ({} tags created, {} linked)",
                summary.categories,
                summary.guidelines,
                summary.references,
                summary.tags_created,
                summary.tags_linked
            );
            0
        }
        Err(error) => {
            eprintln!("❌ Import failed, nothing was written: {}", error);
            1
        }
    }
}

fn run_category_list(store: &TaxonomyStore) -> i32 {
    let categories = match store.list_categories() {
        Ok(categories) => categories,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };
    for category in categories {
        println!("{}  {}", category.slug, category.name);
    }
    0
}

fn run_guideline_list(store: &TaxonomyStore) -> i32 {
    let guidelines = match store.list_guidelines(GuidelineFilter::default()) {
        Ok(guidelines) => guidelines,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };
    for guideline in guidelines {
        println!("{}  {}", guideline.slug, guideline.title);
    }
    0
}

fn run_guideline_show(store: &TaxonomyStore, slug: &str) -> i32 {
    let guideline = match store.guideline_by_slug(slug) {
        Ok(guideline) => guideline,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };
    let detail = match store.guideline_detail(guideline.id) {
        Ok(detail) => detail,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };
    println!("Title:    {}", detail.guideline.title);
    println!("Slug:     {}", detail.guideline.slug);
    println!("Category: {}", detail.category.name);
    println!("Version:  {}", detail.guideline.version);
    let tag_names: Vec<&str> = detail.tags.iter().map(|tag| tag.name.as_str()).collect();
    println!("Tags:     {}", tag_names.join(", "));
    for reference in &detail.references {
        match &reference.url {
            Some(url) => println!("Ref:      {} <{}>", reference.title, url),
            None => println!("Ref:      {}", reference.title),
        }
    }
    println!();
    println!("{}", detail.guideline.content);
    0
}

fn run_tag_list(store: &TaxonomyStore) -> i32 {
    let tags = match store.list_tags() {
        Ok(tags) => tags,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };
    for tag in tags {
        println!("{}  {}", tag.slug, tag.name);
    }
    0
}

#[derive(Debug)]
enum Command {
    Help,
    Import(PathBuf),
    CategoryList,
    GuidelineList,
    GuidelineShow(String),
    TagList,
}

#[derive(Debug)]
struct ParsedArgs {
    runtime_root: PathBuf,
    command: Command,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            command: Command::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut tokens = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            tokens.push(arg);
        }
    }

    let command = match tokens
        .iter()
        .map(|token| token.as_str())
        .collect::<Vec<&str>>()
        .as_slice()
    {
        [] | ["help"] => Command::Help,
        ["import", file] => Command::Import(PathBuf::from(file)),
        ["category", "list"] => Command::CategoryList,
        ["guideline", "list"] => Command::GuidelineList,
        ["guideline", "show", slug] => Command::GuidelineShow(slug.to_string()),
        ["tag", "list"] => Command::TagList,
        _ => return Err(format!("Unknown command: {}", tokens.join(" "))),
    };

    let runtime_root = make_runtime_root_absolute(runtime_root)?;
    Ok(ParsedArgs {
        runtime_root,
        command,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}

fn help_text() -> String {
    [
        "Vademecum taxonomy administration",
        "",
        "Usage: vademecum [-C <root>] <command>",
        "",
        "Commands:",
        "  import <file>          Import categories and guidelines from a YAML file",
        "  category list          List categories",
        "  guideline list         List guidelines",
        "  guideline show <slug>  Show one guideline with its relations",
        "  tag list               List tags",
        "  help                   Show this help",
        "",
        "Options:",
        "  -C <root>              Runtime directory (default: current directory)",
        "",
    ]
    .join("\n")
}
