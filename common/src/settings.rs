use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::prelude::*;

#[derive(Debug)]
pub struct SettingsReader {}

impl SettingsReader {
    /// Read settings from a local JSON file
    pub fn read_config_file<Settings>(path: &str) -> Result<Settings>
    where
        Settings: for<'de> Deserialize<'de>,
    {
        let mut file =
            File::open(path).with_context(|| format!("Failed to open settings file: {path}"))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::parse(&contents).with_context(|| format!("Failed to parse settings file: {path}"))
    }

    pub fn parse<Settings>(contents: &str) -> Result<Settings>
    where
        Settings: for<'de> Deserialize<'de>,
    {
        let settings: Settings = serde_json::from_str(contents)?;
        Ok(settings)
    }
}
