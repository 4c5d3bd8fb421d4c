use clap::{Parser, Subcommand};
use deck_weather_core::{
    PluginContext, RefreshScheduler, SharedAction, TimerRegistry, provider_from_config,
};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::console::{ConsoleKey, FileSettings};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "deck-weather", version, about = "Weather on a control-surface button")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the button once and exit.
    Show,

    /// Keep the button refreshing.
    ///
    /// Enter = key press, `r` = reload settings, `q` = quit.
    Watch,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = Arc::new(FileSettings::new(self.config));
        let config = settings.load()?;
        if !config.is_configured() {
            warn!("API key or coordinates missing from config; the button will say so");
        }

        let provider = provider_from_config(&config)?;
        let context = Arc::new(PluginContext::new(provider));
        let scheduler = RefreshScheduler::new(context, Arc::new(TimerRegistry::new()), settings.clone());
        let key: SharedAction = Arc::new(ConsoleKey::new());

        match self.command {
            Command::Show => {
                scheduler.on_will_appear(&key).await;
                scheduler.shutdown();
            }
            Command::Watch => {
                scheduler.on_will_appear(&key).await;
                watch(&scheduler, &settings, &key).await?;
                scheduler.stop(&key).await;
                scheduler.shutdown();
            }
        }

        Ok(())
    }
}

async fn watch(scheduler: &RefreshScheduler, settings: &FileSettings, key: &SharedAction) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {
                        scheduler.on_key_down(key).await;
                    }
                    "r" => match settings.load() {
                        Ok(config) => {
                            scheduler
                                .on_did_receive_global_settings(config.settings, std::slice::from_ref(key))
                                .await;
                        }
                        Err(e) => warn!(error = %e, "Failed to reload settings"),
                    },
                    "q" => break,
                    other => warn!(input = other, "Unknown command (Enter = press, r = reload, q = quit)"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}
