/*
 *  config.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::clock::ClockStyle;
use crate::surface::layout::{REFERENCE_HEIGHT, REFERENCE_WIDTH};

/// Largest display side accepted, in pixels
pub const MAX_DISPLAY_SIDE: u32 = 4096;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub clock: Option<ClockConfig>,
    pub display: Option<DisplayConfig>,
    /// newline delimited JSON payloads, "-" for stdin
    pub messages: Option<PathBuf>,
    /// seconds between ticks, 60 on a watch
    pub tick_secs: Option<u64>,
    /// dump the framebuffer after every event
    pub render: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClockConfig {
    pub style: Option<ClockStyle>,  // "24h" | "12h"
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_bitmaps: Option<usize>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "wxface", version, about = "Weather clock face")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// true for 24 hour clock, false for 12 hour
    #[arg(long, action = ArgAction::Set)]
    pub clock_24h: Option<bool>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    /// bitmaps the host can hold at once
    #[arg(long)]
    pub max_bitmaps: Option<usize>,
    /// weather payload source, one JSON object per line ("-" for stdin)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub messages: Option<PathBuf>,
    #[arg(long)]
    pub tick_secs: Option<u64>,
    /// print the framebuffer after every event
    #[arg(long, action = ArgAction::SetTrue)]
    pub render: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn clock_style(&self) -> ClockStyle {
        self.clock.as_ref().and_then(|c| c.style).unwrap_or_default()
    }

    pub fn display_size(&self) -> (u32, u32) {
        let d = self.display.as_ref();
        (
            d.and_then(|d| d.width).unwrap_or(REFERENCE_WIDTH),
            d.and_then(|d| d.height).unwrap_or(REFERENCE_HEIGHT),
        )
    }

    pub fn max_bitmaps(&self) -> usize {
        self.display.as_ref().and_then(|d| d.max_bitmaps).unwrap_or(1)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.tick_secs.unwrap_or(60))
    }

    pub fn render(&self) -> bool {
        self.render.unwrap_or(false)
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = resolve(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Build the effective config for already parsed arguments
pub fn resolve(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/wxface/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/wxface/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/wxface.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["wxface.yaml", "config.yaml", "config/wxface.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()  { dst.log_level = src.log_level; }
    if src.messages.is_some()   { dst.messages = src.messages; }
    if src.tick_secs.is_some()  { dst.tick_secs = src.tick_secs; }
    if src.render.is_some()     { dst.render = src.render; }
    // clock
    match (&mut dst.clock, src.clock) {
        (None, Some(c)) => dst.clock = Some(c),
        (Some(d), Some(s)) => {
            if s.style.is_some() { d.style = s.style; }
        }
        _ => {}
    }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.max_bitmaps.is_some() { dst.max_bitmaps = src.max_bitmaps; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()  { cfg.log_level = cli.log_level.clone(); }
    if cli.messages.is_some()   { cfg.messages = cli.messages.clone(); }
    if cli.tick_secs.is_some()  { cfg.tick_secs = cli.tick_secs; }
    if cli.render               { cfg.render = Some(true); }

    if let Some(is_24h) = cli.clock_24h {
        cfg.clock.get_or_insert_with(ClockConfig::default).style = Some(ClockStyle::from_24h(is_24h));
    }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.max_bitmaps.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if cli.max_bitmaps.is_some()    { display.max_bitmaps = cli.max_bitmaps; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if LevelFilter::from_str(level).is_err() {
            return Err(ConfigError::Validation(format!("unknown log_level {:?}", level)));
        }
    }
    if let Some(display) = cfg.display.as_ref() {
        let sides = [display.width, display.height];
        if sides.iter().flatten().any(|&side| side == 0 || side > MAX_DISPLAY_SIDE) {
            return Err(ConfigError::Validation(format!(
                "display width/height must be 1..={}",
                MAX_DISPLAY_SIDE
            )));
        }
        if display.max_bitmaps == Some(0) {
            return Err(ConfigError::Validation("display max_bitmaps must be >= 1".into()));
        }
    }
    if let Some(secs) = cfg.tick_secs {
        if !(1..=60).contains(&secs) {
            return Err(ConfigError::Validation("tick_secs must be 1..=60".into()));
        }
    }
    Ok(())
}
