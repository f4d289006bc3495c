// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Storykeep CLI entrypoint.
//!
//! Hydrates a context from a LoadData snapshot and prints the node outline. Useful for
//! checking what the editor will see before a session starts.

use std::error::Error;

use storykeep::{EditorConfig, HydrationReport, LoadData, NodeId, NodesContext};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <load-data.json> [--config <path>] [--report]\n  {program} --schema\n\nPrints the node outline of the snapshot. Dirty nodes are marked with `*`.\n--report also lists what hydration repaired (duplicates, orphans, paneIds).\n--schema prints the JSON schema of the snapshot format.\n\nLogging follows RUST_LOG (default `warn`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    schema: bool,
    report: bool,
    load_data: Option<String>,
    config: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => {
                if options.schema {
                    return Err(());
                }
                options.schema = true;
            }
            "--report" => {
                if options.report {
                    return Err(());
                }
                options.report = true;
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.load_data.is_some() {
                    return Err(());
                }
                options.load_data = Some(arg);
            }
        }
    }

    if options.schema {
        if options.load_data.is_some() || options.config.is_some() || options.report {
            return Err(());
        }
    } else if options.load_data.is_none() {
        return Err(());
    }

    Ok(options)
}

fn print_ids(label: &str, ids: &[NodeId]) {
    if ids.is_empty() {
        return;
    }
    let ids = ids.iter().map(NodeId::as_str).collect::<Vec<_>>();
    println!("{label}: {}", ids.join(", "));
}

fn print_report(report: &HydrationReport) {
    println!("inserted: {}", report.inserted);
    if report.is_clean() {
        println!("no repairs");
        return;
    }
    print_ids("duplicates", &report.duplicates);
    print_ids("dropped", &report.dropped_orphans);
    print_ids("reconciled", &report.reconciled);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "storykeep".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if options.schema {
            let schema = schemars::schema_for!(LoadData);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            return Ok(());
        }

        let config = match options.config.as_deref() {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        let Some(path) = options.load_data.as_deref() else {
            print_usage(&program);
            std::process::exit(2);
        };
        let data = LoadData::from_path(path)?;

        let ctx = NodesContext::new(config);
        let report = ctx.build_nodes_tree_from_row_data_made_nodes(data);
        print!("{}", ctx.render_outline());
        if options.report {
            println!();
            print_report(&report);
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("storykeep: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_snapshot_path() {
        let options = parse(&["snapshot.json"]).expect("parse options");
        assert_eq!(options.load_data.as_deref(), Some("snapshot.json"));
        assert!(!options.report);
        assert!(!options.schema);
    }

    #[test]
    fn parses_config_and_report_in_any_order() {
        let options =
            parse(&["--report", "snapshot.json", "--config", "editor.json"]).expect("parse");
        assert!(options.report);
        assert_eq!(options.config.as_deref(), Some("editor.json"));
        assert_eq!(options.load_data.as_deref(), Some("snapshot.json"));
    }

    #[test]
    fn parses_schema_alone() {
        let options = parse(&["--schema"]).expect("parse options");
        assert!(options.schema);
        assert!(options.load_data.is_none());
    }

    #[test]
    fn rejects_schema_with_snapshot() {
        parse(&["--schema", "snapshot.json"]).unwrap_err();
    }

    #[test]
    fn requires_a_snapshot() {
        parse(&[]).unwrap_err();
        parse(&["--report"]).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_args() {
        parse(&["--nope", "snapshot.json"]).unwrap_err();
        parse(&["a.json", "b.json"]).unwrap_err();
        parse(&["a.json", "--report", "--report"]).unwrap_err();
        parse(&["a.json", "--config"]).unwrap_err();
    }
}
