use anyhow::{Context, Result};
use colored::Colorize;

use super::{confirmed, manager_from};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("add", sub_matches)) => add_lun(sub_matches),
        Some(("delete", sub_matches)) => delete_lun(sub_matches),
        _ => {
            println!("Use 'ietlv lun --help' for more information.");
            Ok(())
        }
    }
}

fn target_and_lun(matches: &clap::ArgMatches) -> Result<(&String, u32)> {
    let name = matches
        .get_one::<String>("name")
        .context("Name argument is required")?;
    let lun = *matches
        .get_one::<u32>("lun")
        .context("LUN argument is required")?;
    Ok((name, lun))
}

fn add_lun(matches: &clap::ArgMatches) -> Result<()> {
    let (name, lun) = target_and_lun(matches)?;
    let size = matches
        .get_one::<String>("size")
        .context("Size argument is required")?;

    let manager = manager_from(matches)?;
    let info = manager
        .add_lun(name, lun, size)
        .with_context(|| format!("Could not add LUN {} to '{}'", lun, name))?;

    println!(
        "{} {} {} {}",
        format!("✓ LUN {}", info.lun).green().bold(),
        "attached to".green(),
        info.iqn.cyan().bold(),
        format!("(tid {})", info.tid).dimmed()
    );
    println!("  {} {} ({})", "volume".dimmed(), info.path, size.yellow());
    Ok(())
}

fn delete_lun(matches: &clap::ArgMatches) -> Result<()> {
    let (name, lun) = target_and_lun(matches)?;

    let manager = manager_from(matches)?;
    let prompt = format!(
        "Detach LUN {} from {} and destroy its volume? (y/n):",
        lun,
        manager.full_iqn(name)?
    );
    if !confirmed(matches, &prompt)? {
        return Ok(());
    }

    let info = manager
        .delete_lun(name, lun)
        .with_context(|| format!("Could not delete LUN {} of '{}'", lun, name))?;

    println!(
        "{} {} {}",
        format!("✓ LUN {}", info.lun).green().bold(),
        "removed from".green(),
        info.iqn.cyan().bold()
    );
    println!("  {} {}", "removed".red(), info.path);
    Ok(())
}
