use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use mediamover::config::ConfigStorage;
use mediamover::ui;
use mediamover::MoverController;

/// Options accepted as `key=value` arguments.
struct CliOptions {
    config_file: Option<PathBuf>,
    color: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> CliOptions {
    let mut options = CliOptions {
        config_file: None,
        color: true,
    };
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            ui::err(format!("Ignoring malformed argument: {}", arg));
            continue;
        };
        match key {
            "config_file" => options.config_file = Some(PathBuf::from(value)),
            "color" => {
                if matches!(value, "off" | "false" | "no" | "0") {
                    options.color = false;
                }
            }
            _ => ui::err(format!("Ignoring unknown argument: {}", key)),
        }
    }
    options
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let options = parse_args(std::env::args().skip(1));
    ui::color::set_color(options.color);

    let storage = match options.config_file {
        Some(path) => ConfigStorage::with_path(path),
        None => match ConfigStorage::new() {
            Ok(storage) => storage,
            Err(e) => {
                ui::err(format!("Could not locate a config directory: {}", e));
                std::process::exit(1);
            }
        },
    };

    let mut controller = match MoverController::new(storage).await {
        Ok(controller) => controller,
        Err(e) => {
            ui::err(format!("Could not load config: {}", e));
            std::process::exit(1);
        }
    };
    controller.run().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(list: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        list.iter().map(|s| s.to_string())
    }

    #[test]
    fn config_file_and_color_arguments() {
        let options = parse_args(args(&["config_file=/tmp/mover.json", "color=off"]));
        assert_eq!(options.config_file, Some(PathBuf::from("/tmp/mover.json")));
        assert!(!options.color);
    }

    #[test]
    fn defaults_when_no_arguments() {
        let options = parse_args(args(&[]));
        assert_eq!(options.config_file, None);
        assert!(options.color);
    }

    #[test]
    fn malformed_arguments_are_skipped() {
        let options = parse_args(args(&["nonsense", "color=banana"]));
        assert_eq!(options.config_file, None);
        assert!(options.color);
    }
}
