use crate::core::{validation, Config, IoType};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Persisted setting addressed by `ietlv set/get`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingKey {
    IqnBase,
    Volgroup,
    IetdConfig,
    IoType,
}

impl SettingKey {
    const ALL: [SettingKey; 4] = [
        SettingKey::IqnBase,
        SettingKey::Volgroup,
        SettingKey::IetdConfig,
        SettingKey::IoType,
    ];

    fn name(&self) -> &'static str {
        match self {
            SettingKey::IqnBase => "iqn-base",
            SettingKey::Volgroup => "volgroup",
            SettingKey::IetdConfig => "ietd-config",
            SettingKey::IoType => "iotype",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    fn set(&self, config: &mut Config, value: &str) -> Result<()> {
        match self {
            SettingKey::IqnBase => {
                validation::validate_iqn_base(value)?;
                config.set_iqn_base(value.to_string());
            }
            SettingKey::Volgroup => {
                validation::validate_volgroup(value)?;
                config.set_volgroup(value.to_string());
            }
            SettingKey::IetdConfig => config.set_ietd_config(PathBuf::from(value)),
            SettingKey::IoType => config.set_iotype(value.parse::<IoType>()?),
        }
        Ok(())
    }

    fn get(&self, config: &Config) -> Option<String> {
        match self {
            SettingKey::IqnBase => config.iqn_base.clone(),
            SettingKey::Volgroup => config.volgroup.clone(),
            SettingKey::IetdConfig => Some(config.ietd_config.display().to_string()),
            SettingKey::IoType => Some(config.iotype.to_string()),
        }
    }

    fn example_value(&self) -> &'static str {
        match self {
            SettingKey::IqnBase => "iqn.2007-12.net.enpraxis",
            SettingKey::Volgroup => "vg_spare",
            SettingKey::IetdConfig => "/etc/iet/ietd.conf",
            SettingKey::IoType => "blockio",
        }
    }
}

pub fn handle_set(matches: &clap::ArgMatches) -> Result<()> {
    let key_name = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let key = SettingKey::from_name(key_name)
        .with_context(|| format!("Unknown setting '{}'", key_name))?;

    let mut config = Config::load()?;
    key.set(&mut config, value)?;
    config.save()?;

    println!(
        "{} {}",
        format!("✓ {} set to:", key.name()).green(),
        value.cyan().bold()
    );
    Ok(())
}

pub fn handle_get(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;

    match matches.get_one::<String>("key") {
        Some(key_name) => {
            let key = SettingKey::from_name(key_name)
                .with_context(|| format!("Unknown setting '{}'", key_name))?;
            print_setting(&config, key);
        }
        None => {
            println!(
                "{} {}",
                "Settings file:".white().bold(),
                Config::get_config_path()?.display().to_string().dimmed()
            );
            for key in SettingKey::ALL {
                print_setting(&config, key);
            }
        }
    }

    Ok(())
}

fn print_setting(config: &Config, key: SettingKey) {
    match key.get(config) {
        Some(value) => println!("  {:<12} {}", key.name().white(), value.cyan().bold()),
        None => {
            println!("  {:<12} {}", key.name().white(), "(not set)".yellow());
            println!(
                "  {:<12} {}",
                "",
                format!("ietlv set {} {}", key.name(), key.example_value()).dimmed()
            );
        }
    }
}
