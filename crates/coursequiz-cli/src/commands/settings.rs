//! The `coursequiz settings` command.

use anyhow::Result;
use serde_json::Value;

use super::DataPaths;

/// Show every setting, show one, or set one.
///
/// Values are parsed as JSON when possible and stored as strings otherwise.
pub fn execute(paths: &DataPaths, key: Option<String>, value: Option<String>) -> Result<()> {
    let config = paths.load_config()?;
    let mut store = paths.open_store(&config);

    match (key, value) {
        (None, _) => {
            for (key, value) in &store.data().config {
                println!("{key} = {value}");
            }
        }
        (Some(key), None) if key == "theme" => println!("{}", store.theme()),
        (Some(key), None) => match store.setting(&key) {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("no such setting: {key}"),
        },
        (Some(key), Some(value)) if key == "theme" => {
            store.set_theme(&value)?;
            println!("theme = {value}");
        }
        (Some(key), Some(value)) => {
            let parsed = serde_json::from_str(&value).unwrap_or(Value::String(value));
            store.set_setting(&key, parsed.clone())?;
            println!("{key} = {parsed}");
        }
    }
    Ok(())
}
