//! VR-017: CLI subcommands: vm, vmss, validate, images, schema.

use crate::core::catalog::ImageCatalog;
use crate::core::error::ResolveError;
use crate::core::pipeline::{self, ResolveContext};
use crate::core::{parser, types};
use crate::credentials::prompt::NoPrompt;
use crate::credentials::{LocalKeyMaterial, Prompter, TerminalPrompter};
use crate::transport::azcli::AzCliQuery;
use crate::transport::inventory::Inventory;
use crate::transport::ResourceQuery;
use clap::{Args, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable consulted when `--subscription` is absent.
pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a `vm create` request
    Vm {
        /// Path to the request file
        #[arg(short, long, default_value = "vm.yaml")]
        file: PathBuf,

        #[command(flatten)]
        opts: ResolveOpts,
    },

    /// Resolve a `vmss create` request
    Vmss {
        /// Path to the request file
        #[arg(short, long, default_value = "vmss.yaml")]
        file: PathBuf,

        #[command(flatten)]
        opts: ResolveOpts,
    },

    /// Validate a request file without querying any infrastructure
    Validate {
        /// Path to the request file
        #[arg(short, long)]
        file: PathBuf,

        /// Request kind
        #[arg(short, long, value_enum, default_value_t = FlowArg::Vm)]
        kind: FlowArg,
    },

    /// List image aliases
    Images {
        /// Alias catalog file (YAML or JSON); built-in list when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the JSON schema of the resolved output
    Schema,
}

/// Options shared by the resolving subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveOpts {
    /// Answer existence queries from an inventory file instead of `az`
    #[arg(long)]
    pub inventory: Option<PathBuf>,

    /// Subscription id used to qualify bare resource names
    #[arg(long)]
    pub subscription: Option<String>,

    /// Alias catalog file (YAML or JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Never prompt; fail instead when a password is missing
    #[arg(long)]
    pub no_prompt: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowArg {
    Vm,
    Vmss,
}

impl From<FlowArg> for types::Flow {
    fn from(f: FlowArg) -> Self {
        match f {
            FlowArg::Vm => Self::Vm,
            FlowArg::Vmss => Self::Vmss,
        }
    }
}

/// A failed command: message plus process exit code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
    pub code: i32,
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        Self { message, code: 1 }
    }
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        Self {
            code: e.exit_code(),
            message: e.to_string(),
        }
    }
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Vm { file, opts } => cmd_resolve(types::Flow::Vm, &file, &opts),
        Commands::Vmss { file, opts } => cmd_resolve(types::Flow::Vmss, &file, &opts),
        Commands::Validate { file, kind } => cmd_validate(&file, kind.into()),
        Commands::Images { catalog } => cmd_images(catalog.as_deref()),
        Commands::Schema => cmd_schema(),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<ImageCatalog, String> {
    match path {
        Some(p) => ImageCatalog::load(p),
        None => Ok(ImageCatalog::builtin()),
    }
}

/// Pick the subscription: flag, then environment, then the inventory, then `az`.
pub fn resolve_subscription(
    flag: Option<&str>,
    env: Option<String>,
    inventory: Option<&Inventory>,
    az: Option<&AzCliQuery>,
) -> Result<String, CliError> {
    if let Some(s) = flag.filter(|s| !s.is_empty()) {
        return Ok(s.to_string());
    }
    if let Some(s) = env.filter(|s| !s.is_empty()) {
        return Ok(s);
    }
    if let Some(s) = inventory.and_then(|i| i.subscription.clone()) {
        return Ok(s);
    }
    match az {
        Some(az) => Ok(az.current_subscription().map_err(ResolveError::from)?),
        None => Err(CliError {
            message: format!(
                "no subscription: pass --subscription, set {}, or add one to the inventory",
                SUBSCRIPTION_ENV
            ),
            code: 2,
        }),
    }
}

enum Request {
    Vm(types::VmCreateRequest),
    Vmss(types::VmssCreateRequest),
}

/// Run the pipeline for the request in `file`.
pub fn resolve_file(
    flow: types::Flow,
    file: &Path,
    opts: &ResolveOpts,
) -> Result<types::Namespace, CliError> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {}", file.display(), e))?;
    let errors = parser::validate_request(&text, flow)?;
    if !errors.is_empty() {
        return Err(validation_failed(&errors));
    }
    let request = match flow {
        types::Flow::Vm => Request::Vm(parser::parse_vm_request(&text)?),
        types::Flow::Vmss => Request::Vmss(parser::parse_vmss_request(&text)?),
    };
    let catalog = load_catalog(opts.catalog.as_deref())?;
    let env = std::env::var(SUBSCRIPTION_ENV).ok();

    let inventory;
    let az;
    let (query, subscription): (&dyn ResourceQuery, String) = match opts.inventory {
        Some(ref path) => {
            inventory = Inventory::load(path)?;
            let sub =
                resolve_subscription(opts.subscription.as_deref(), env, Some(&inventory), None)?;
            (&inventory, sub)
        }
        None => {
            let sub = resolve_subscription(
                opts.subscription.as_deref(),
                env,
                None,
                Some(&AzCliQuery::new()),
            )?;
            az = AzCliQuery::new().with_subscription(&sub);
            (&az, sub)
        }
    };
    debug!(%flow, subscription = %subscription, "resolving request");

    let keys = LocalKeyMaterial::default();
    let prompter: &dyn Prompter = if opts.no_prompt { &NoPrompt } else { &TerminalPrompter };
    let ctx = ResolveContext {
        subscription,
        query,
        catalog: &catalog,
        keys: &keys,
        prompter,
    };

    let ns = match request {
        Request::Vm(req) => pipeline::process_vm_create(req, &ctx)?,
        Request::Vmss(req) => pipeline::process_vmss_create(req, &ctx)?,
    };
    Ok(ns)
}

/// Serialize the namespace with the admin password masked.
pub fn render(ns: &types::Namespace, format: OutputFormat) -> Result<String, String> {
    let shown = ns.redacted();
    match format {
        OutputFormat::Yaml => {
            serde_yaml_ng::to_string(&shown).map_err(|e| format!("YAML encode error: {}", e))
        }
        OutputFormat::Json => serde_json::to_string_pretty(&shown)
            .map_err(|e| format!("JSON encode error: {}", e)),
    }
}

fn cmd_resolve(flow: types::Flow, file: &Path, opts: &ResolveOpts) -> Result<(), CliError> {
    let ns = resolve_file(flow, file, opts)?;
    println!("{}", render(&ns, opts.format)?.trim_end());
    Ok(())
}

fn cmd_validate(file: &Path, flow: types::Flow) -> Result<(), CliError> {
    let errors = parser::validate_request_file(file, flow)?;
    if errors.is_empty() {
        println!("OK: {} ({} request)", file.display(), flow);
        Ok(())
    } else {
        Err(validation_failed(&errors))
    }
}

/// Print each error and summarize them as a usage failure.
fn validation_failed(errors: &[parser::ValidationError]) -> CliError {
    for e in errors {
        eprintln!("  ERROR: {}", e);
    }
    CliError {
        message: format!("{} validation error(s)", errors.len()),
        code: 2,
    }
}

fn cmd_images(catalog: Option<&Path>) -> Result<(), CliError> {
    let catalog = load_catalog(catalog)?;
    for alias in catalog.aliases() {
        println!("{:<24} {}", alias.urn_alias, alias.urn());
    }
    Ok(())
}

fn cmd_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(types::Namespace);
    let json = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("JSON encode error: {}", e))?;
    println!("{}", json);
    Ok(())
}
