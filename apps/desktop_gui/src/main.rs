mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use clap::Parser;
use client_core::DEFAULT_SERVER_URL;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::{PersistedSettings, TokenManagerApp, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "token-manager", about = "Desktop token registry manager")]
struct Args {
    /// Overrides the server URL remembered from the last session.
    #[arg(long, env = "TOKEN_REGISTRY_URL")]
    server_url: Option<String>,
}

fn resolve_server_url(cli: Option<String>, persisted: Option<PersistedSettings>) -> String {
    cli.filter(|url| !url.trim().is_empty())
        .or_else(|| persisted.map(|settings| settings.server_url))
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Token Manager")
            .with_inner_size([760.0, 560.0])
            .with_min_inner_size([520.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Token Manager",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedSettings>(&text).ok())
            });
            let server_url = resolve_server_url(args.server_url, persisted);
            Ok(Box::new(TokenManagerApp::new(cmd_tx, ui_rx, server_url)))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted(url: &str) -> Option<PersistedSettings> {
        Some(PersistedSettings {
            server_url: url.to_string(),
        })
    }

    #[test]
    fn command_line_url_wins_over_persisted() {
        assert_eq!(
            resolve_server_url(Some("http://cli:1".to_string()), persisted("http://saved:2")),
            "http://cli:1"
        );
    }

    #[test]
    fn persisted_url_used_when_no_override() {
        assert_eq!(resolve_server_url(None, persisted("http://saved:2")), "http://saved:2");
        assert_eq!(
            resolve_server_url(Some("  ".to_string()), persisted("http://saved:2")),
            "http://saved:2"
        );
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(resolve_server_url(None, None), DEFAULT_SERVER_URL);
        assert_eq!(resolve_server_url(None, persisted("")), DEFAULT_SERVER_URL);
    }
}
