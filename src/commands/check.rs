use crate::*;

pub fn handle_run_commands(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Check {
            server,
            no_quarantine,
        } => {
            let opts = RunOptions {
                write: true,
                quarantine: !no_quarantine,
            };
            let report = run(&cli.root, config, server.as_deref(), opts)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: &report
                    })?
                );
            } else {
                print_run_summary(&report);
            }
        }
        Commands::Audit { server, strict } => {
            let opts = RunOptions {
                write: false,
                quarantine: false,
            };
            let report = run(&cli.root, config, server.as_deref(), opts)?;
            let blocking = report.audit.is_release_blocking();
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: !(*strict && blocking),
                        data: &report
                    })?
                );
            } else {
                print_run_summary(&report);
            }
            if *strict && blocking {
                std::process::exit(1);
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn print_run_summary(report: &RunReport) {
    for d in &report.distributions {
        println!("{}\titems={}\tcredits={}", d.name, d.items, d.credits);
        if let Some(e) = &d.error {
            println!("write_failed\t{}\t{e}", d.name);
        }
    }
    let sections = [
        ("unresolved", &report.audit.unresolved),
        ("missing_link", &report.audit.missing_link),
        ("prohibited", &report.audit.prohibited),
        ("unregistered", &report.audit.unregistered),
    ];
    for (kind, findings) in sections {
        for f in findings {
            if f.reference.is_empty() {
                println!("{kind}\t{}\t{}", f.modid, f.license);
            } else {
                println!("{kind}\t{}\t{}\t{}", f.modid, f.license, f.reference);
            }
        }
    }
    if let Some(q) = &report.quarantine {
        for m in &q.moved {
            println!("moved\t{}\t{}", m.modid, m.to.display());
        }
        for f in &q.failed {
            println!("move_failed\t{}\t{}", f.modid, f.error);
        }
    }
    if report.canonical_written {
        println!("updated {}", report.canonical_table.display());
    }
}
