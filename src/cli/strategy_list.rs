//! Strategy and model listings

use crate::core::config::Config;
use crate::core::session::SessionSettings;
use crate::core::version::{VersionRouter, VersionToken};
use crate::utils::url::construct_api_url;

pub fn list_strategies(settings: &SessionSettings) {
    println!("🧭 Answering strategies");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in strategy_lines(settings) {
        println!("{line}");
    }
}

fn strategy_lines(settings: &SessionSettings) -> Vec<String> {
    VersionRouter::routes()
        .map(|(token, endpoint)| {
            let marker = if token == settings.version { "*" } else { " " };
            format!(
                "{marker} {:<9} {:<9} {}\n    {}",
                token.as_str(),
                token.label(),
                construct_api_url(&settings.backend_url, endpoint),
                token.description()
            )
        })
        .collect()
}

pub fn list_models(config: &Config, settings: &SessionSettings) {
    println!("🤖 Models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in model_lines(config, settings) {
        println!("{line}");
    }
    println!();
    println!("Any model the backend can run is accepted; pick one with -m <name>.");
    if settings.version == VersionToken::Plain {
        println!("Libraries are ignored while the plain strategy is active.");
    }
}

fn model_lines(config: &Config, settings: &SessionSettings) -> Vec<String> {
    let mut lines: Vec<String> = config
        .model_choices()
        .into_iter()
        .map(|model| {
            let marker = if model == settings.model { "*" } else { " " };
            format!("{marker} {model}")
        })
        .collect();
    if !config.is_known_model(&settings.model) {
        lines.push(format!("* {} (custom)", settings.model));
    }
    lines
}
