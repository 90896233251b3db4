use anyhow::{Context, Result};

use super::manager_from;
use crate::ui::render_volume_table;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("volumes", sub_matches)) => show_volumes(sub_matches),
        Some(("sessions", sub_matches)) => show_sessions(sub_matches),
        _ => {
            println!("Use 'ietlv show --help' for more information.");
            Ok(())
        }
    }
}

fn show_volumes(matches: &clap::ArgMatches) -> Result<()> {
    let manager = manager_from(matches)?;

    if matches.get_flag("parsed") {
        let table = manager
            .volume_table()
            .context("Could not read the ietd volume table")?;
        println!("{}", render_volume_table(&table));
    } else {
        let raw = manager
            .list_volumes()
            .context("Could not read the ietd volume table")?;
        print!("{}", raw);
    }
    Ok(())
}

fn show_sessions(matches: &clap::ArgMatches) -> Result<()> {
    let manager = manager_from(matches)?;
    let raw = manager
        .list_sessions()
        .context("Could not read the ietd session table")?;
    print!("{}", raw);
    Ok(())
}
