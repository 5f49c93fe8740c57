use crate::config::settings::Settings;
use crate::domain::model::Strategy;
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "park-watch.toml";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    DirectFetch,
    Interactive,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::DirectFetch => Strategy::DirectFetch,
            StrategyArg::Interactive => Strategy::Interactive,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "park-watch")]
#[command(about = "Check campsite availability for one park and date, and email the result")]
pub struct CliArgs {
    /// Path to TOML configuration file (built-in defaults when absent)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the acquisition strategy from config
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override the park name
    #[arg(long)]
    pub park: Option<String>,

    /// Override the arrival date (YYYY-MM-DD)
    #[arg(long)]
    pub arrival: Option<NaiveDate>,

    /// Override the number of nights
    #[arg(long)]
    pub nights: Option<u32>,

    /// Print the message instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Emit JSON log lines (for scheduled runs)
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// 載入設定檔並套用命令列覆蓋設定
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Settings::from_file(DEFAULT_CONFIG_PATH)?,
            None => Settings::default(),
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(strategy) = self.strategy {
            settings.acquire.strategy = strategy.into();
            tracing::info!("🔧 Strategy overridden to: {}", settings.acquire.strategy);
        }
        if let Some(park) = &self.park {
            settings.target.park = park.clone();
        }
        if let Some(arrival) = self.arrival {
            settings.target.arrival = arrival;
        }
        if let Some(nights) = self.nights {
            settings.target.nights = nights;
        }
    }
}
