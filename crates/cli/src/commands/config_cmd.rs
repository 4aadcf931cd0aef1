//! `steward config`: show the effective configuration.

use steward_config::AppConfig;

pub fn show(config: &AppConfig, default: bool) {
    if default {
        print!("{}", AppConfig::default_toml());
        return;
    }

    println!(
        "# {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    print!("{}", config.to_toml());
}
