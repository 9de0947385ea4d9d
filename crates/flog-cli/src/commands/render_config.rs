//! Show the effective configuration.

use anyhow::Result;
use flog_core::config::{ConfigLayer, TreeConfig};

pub fn execute(config: &TreeConfig, demo: bool, json: bool) -> Result<()> {
    let rendered = if demo {
        let mut demo = TreeConfig::demo();
        demo.settings = config.settings.clone();
        demo.tracing = config.tracing.clone();
        demo
    } else {
        config.clone()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    let layers: Vec<&str> = config.layers().iter().map(|layer| layer_name(*layer)).collect();
    println!("# layers: {}", layers.join(", "));
    if let Some(path) = config.file_path() {
        println!("# file: {}", path.display());
    }
    print!("{}", rendered.to_yaml()?);
    Ok(())
}

fn layer_name(layer: ConfigLayer) -> &'static str {
    match layer {
        ConfigLayer::Default => "default",
        ConfigLayer::Loaded => "file",
        ConfigLayer::Environment => "environment",
    }
}
