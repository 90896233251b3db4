use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

use ietlv::{commands, ui};

fn yes_arg() -> Arg {
    Arg::new("yes")
        .short('y')
        .long("yes")
        .help("Do not ask for confirmation")
        .action(ArgAction::SetTrue)
}

fn name_arg() -> Arg {
    Arg::new("name")
        .value_name("NAME")
        .help("Short target name, appended to the IQN base")
        .required(true)
}

fn lun_arg() -> Arg {
    Arg::new("lun")
        .value_name("LUN")
        .help("Logical unit number")
        .value_parser(value_parser!(u32))
        .required(true)
}

fn build_cli() -> Command {
    Command::new("ietlv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage iSCSI Enterprise Target targets backed by LVM volumes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("iqn-base")
                .long("iqn-base")
                .value_name("IQN")
                .help("Override the stored IQN base")
                .global(true),
        )
        .arg(
            Arg::new("volgroup")
                .long("volgroup")
                .value_name("VG")
                .help("Override the stored volume group")
                .global(true),
        )
        .arg(
            Arg::new("ietd-config")
                .long("ietd-config")
                .value_name("PATH")
                .help("Override the path of ietd.conf")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("target")
                .about("Create or delete iSCSI targets")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("add")
                        .about("Create a target named <iqn-base>:<NAME>")
                        .arg(name_arg()),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a target")
                        .arg(name_arg())
                        .arg(
                            Arg::new("purge-volumes")
                                .long("purge-volumes")
                                .help("Also remove the logical volumes attached to the target")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(yes_arg()),
                ),
        )
        .subcommand(
            Command::new("lun")
                .about("Create or delete LUNs backed by logical volumes")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("add")
                        .about("Create a logical volume and attach it as a LUN")
                        .arg(name_arg())
                        .arg(lun_arg())
                        .arg(
                            Arg::new("size")
                                .value_name("SIZE")
                                .help("Volume size as accepted by lvcreate -L (e.g. 10G)")
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Detach a LUN and remove its logical volume")
                        .arg(name_arg())
                        .arg(lun_arg())
                        .arg(yes_arg()),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show ietd's live tables")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("volumes")
                        .about("Print /proc/net/iet/volume")
                        .arg(
                            Arg::new("parsed")
                                .long("parsed")
                                .help("Render targets and LUNs as a tree")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("sessions").about("Print /proc/net/iet/session")),
        )
        .subcommand(
            Command::new("set")
                .about("Store a default setting")
                .arg(
                    Arg::new("key")
                        .value_name("KEY")
                        .help("Setting name")
                        .value_parser(["iqn-base", "volgroup", "ietd-config", "iotype"])
                        .required(true),
                )
                .arg(
                    Arg::new("value")
                        .value_name("VALUE")
                        .help("New value")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Show stored settings")
                .arg(
                    Arg::new("key")
                        .value_name("KEY")
                        .help("Setting name; all settings when omitted")
                        .value_parser(["iqn-base", "volgroup", "ietd-config", "iotype"]),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() {
    ietlv::init_logging();

    let matches = build_cli().get_matches();

    if let Err(e) = run(&matches) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("target", sub_matches)) => commands::target::execute(sub_matches),
        Some(("lun", sub_matches)) => commands::lun::execute(sub_matches),
        Some(("show", sub_matches)) => commands::show::execute(sub_matches),
        Some(("set", sub_matches)) => commands::config::handle_set(sub_matches),
        Some(("get", sub_matches)) => commands::config::handle_get(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => {
            println!("Use 'ietlv --help' for more information.");
            Ok(())
        }
    }
}
