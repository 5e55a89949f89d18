//! anco-env command line tool
//!
//! Runs the anco_env probe outside an application, e.g. from `adb shell`
//! on a device or on a development host. Every subcommand goes through the
//! same method-channel dispatch the Android plugin uses and prints the
//! result as JSON on stdout. Logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anco_env_shared::channel::{self, AncoEnvPlugin, MethodCall, MethodResponse};
use anco_env_shared::platform::{self, ShellPackageRegistry};
use anco_env_shared::AppBindings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Probe configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Print the Android version string
    Version,

    /// Check for a HarmonyOS-derived (Anco) environment
    Harmony,

    /// Print the full environment report
    Info,

    /// Look up a single system property
    Prop {
        /// Property name, e.g. ro.build.flavor
        key: String,
    },

    /// Send a raw method call
    Call {
        /// Method name
        method: String,

        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
}

impl Command {
    fn to_method_call(&self) -> Result<MethodCall> {
        let call = match self {
            Command::Version => MethodCall::new(channel::METHOD_GET_PLATFORM_VERSION),
            Command::Harmony => MethodCall::new(channel::METHOD_IS_HARMONY_ANCO),
            Command::Info => MethodCall::new(channel::METHOD_GET_ENV_INFO),
            Command::Prop { key } => MethodCall::new(channel::METHOD_GET_PROP)
                .with_argument(channel::KEY_ARGUMENT, key.as_str()),
            Command::Call { method, args } => {
                let arguments = match args {
                    Some(raw) => serde_json::from_str::<Value>(raw)
                        .with_context(|| format!("Invalid --args JSON: {}", raw))?,
                    None => Value::Null,
                };
                if !(arguments.is_object() || arguments.is_null()) {
                    bail!("--args must be a JSON object");
                }
                MethodCall {
                    method: method.clone(),
                    arguments,
                }
            }
        };
        Ok(call)
    }
}

fn build_plugin(args: &Args) -> AncoEnvPlugin {
    let mut plugin = anco_env_shared::native_plugin(args.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load probe configuration: {}. Using defaults.", e);
        AncoEnvPlugin::native()
    });

    // Package lookups need the package manager, which only exists on a device
    if platform::is_android() {
        plugin.on_attached(AppBindings::new(Arc::new(ShellPackageRegistry::new())));
    }

    plugin
}

fn render(value: &Value, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

fn run(args: Args) -> Result<()> {
    let plugin = build_plugin(&args);
    let call = args.command.to_method_call()?;
    debug!("Dispatching {} on {}", call.method, platform::platform_name());

    match plugin.on_method_call(&call) {
        MethodResponse::Success { result } => {
            println!("{}", render(&result, args.compact)?);
            Ok(())
        }
        MethodResponse::Error { code, message, .. } => bail!("{}: {}", code, message),
        MethodResponse::NotImplemented => bail!("Method not implemented: {}", call.method),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    anco_env_shared::logging::set_debug_enabled(args.debug)
        .map_err(|e| anyhow::anyhow!("Failed to configure logging: {}", e))?;

    run(args)
}
