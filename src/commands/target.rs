use anyhow::{Context, Result};
use colored::Colorize;

use super::{confirmed, manager_from};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("add", sub_matches)) => add_target(sub_matches),
        Some(("delete", sub_matches)) => delete_target(sub_matches),
        _ => {
            println!("Use 'ietlv target --help' for more information.");
            Ok(())
        }
    }
}

fn add_target(matches: &clap::ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .context("Name argument is required")?;

    let manager = manager_from(matches)?;
    let info = manager
        .add_target(name)
        .with_context(|| format!("Could not create iSCSI target '{}'", name))?;

    println!(
        "{} {} {}",
        "✓ Created target".green().bold(),
        info.iqn.cyan().bold(),
        format!("(tid {})", info.tid).dimmed()
    );
    Ok(())
}

fn delete_target(matches: &clap::ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .context("Name argument is required")?;
    let purge = matches.get_flag("purge-volumes");

    let manager = manager_from(matches)?;
    let iqn = manager.full_iqn(name)?;

    let prompt = if purge {
        format!("Delete target {} and remove its logical volumes? (y/n):", iqn)
    } else {
        format!("Delete target {}? (y/n):", iqn)
    };
    if !confirmed(matches, &prompt)? {
        return Ok(());
    }

    let removal = manager
        .delete_target(name, purge)
        .with_context(|| format!("Could not delete iSCSI target '{}'", iqn))?;

    println!(
        "{} {} {}",
        "✓ Deleted target".green().bold(),
        removal.iqn.cyan().bold(),
        format!("(tid {})", removal.tid).dimmed()
    );

    for path in &removal.purged {
        println!("  {} {}", "removed".red(), path);
    }
    if !purge && !removal.volumes.is_empty() {
        println!("{}", "Volumes left in place:".yellow());
        for path in &removal.volumes {
            println!("  {}", path.dimmed());
        }
    }
    Ok(())
}
