use crate::config::{
    AutoDiscoverConfig, BodyUse, EndpointUri, StrategySetting, Style, SOAP_ENCODING_STYLE,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// WSDL from source - Generate WSDL service descriptions from Rust code or signature manifests
#[derive(Parser, Debug)]
#[command(name = "wsdl-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Rust project directory, or a JSON/YAML signature manifest
    #[arg(value_name = "PATH")]
    pub input_path: PathBuf,

    /// Type whose public methods become operations
    #[arg(short = 'c', long = "class", value_name = "NAME")]
    pub class: Option<String>,

    /// Free function to add as an operation (repeatable)
    #[arg(short = 'F', long = "function", value_name = "NAME")]
    pub functions: Vec<String>,

    /// Endpoint URI of the service
    #[arg(short = 'u', long = "uri", value_name = "URI")]
    pub uri: Option<String>,

    /// SOAP binding style
    #[arg(short = 's', long = "style", value_enum)]
    pub style: Option<Style>,

    /// soap:body use of every binding operation
    #[arg(long = "use", value_enum)]
    pub body_use: Option<BodyUse>,

    /// How complex types are mapped into the schema
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Configuration file (YAML or JSON); flags override its values
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Complex type strategy options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StrategyArg {
    /// Records as complex types, arrays as soap-enc:Array
    Default,
    /// Nested arrays as ArrayOf... sequence chains
    Sequence,
    /// SOAP-encoded ArrayOf restrictions, one level deep
    Complex,
    /// Everything complex is xsd:anyType
    Any,
}

impl StrategyArg {
    fn as_str(&self) -> &'static str {
        match self {
            StrategyArg::Default => "default",
            StrategyArg::Sequence => "sequence",
            StrategyArg::Complex => "complex",
            StrategyArg::Any => "any",
        }
    }
}

/// Kind of input the PATH argument names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    SourceProject,
    Manifest,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }
    let kind = input_kind(&args.input_path)?;

    if kind == InputKind::SourceProject && args.class.is_none() && args.functions.is_empty() {
        anyhow::bail!(
            "No operations selected. Use --class or --function to choose what to describe"
        );
    }

    if let Some(uri) = &args.uri {
        EndpointUri::parse(uri)?;
    }

    info!("Input: {} ({:?})", args.input_path.display(), kind);
    if let Some(ref class) = args.class {
        info!("Class: {}", class);
    }
    if !args.functions.is_empty() {
        info!("Functions: {}", args.functions.join(", "));
    }
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Classify the input path as a source directory or a manifest file
pub fn input_kind(path: &Path) -> Result<InputKind> {
    if path.is_dir() {
        return Ok(InputKind::SourceProject);
    }
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") | Some("yaml") | Some("yml") => Ok(InputKind::Manifest),
        _ => anyhow::bail!(
            "Input path must be a project directory or a .json/.yaml/.yml manifest: {}",
            path.display()
        ),
    }
}

/// Load the configuration file, if any, and apply command line overrides
pub fn build_config(args: &CliArgs) -> Result<AutoDiscoverConfig> {
    let mut config = match &args.config_path {
        Some(path) => AutoDiscoverConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => AutoDiscoverConfig::default(),
    };

    if let Some(uri) = &args.uri {
        config.uri = Some(uri.clone());
    }
    if let Some(style) = args.style {
        config.binding_style.style = Some(style);
    }
    if let Some(body_use) = args.body_use {
        config.operation_body_style.use_kind = body_use;
        config.operation_body_style.encoding_style = match body_use {
            BodyUse::Encoded => Some(SOAP_ENCODING_STYLE.to_string()),
            BodyUse::Literal => None,
        };
    }
    if let Some(strategy) = args.strategy {
        config.strategy = StrategySetting::Named(strategy.as_str().to_string());
    }

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::discovery::AutoDiscover;
    use crate::reflection::manifest::ManifestReflector;
    use crate::reflection::source::SourceReflector;
    use crate::reflection::Reflector;
    use crate::serializer::write_to_file;

    info!("Starting WSDL generation...");

    // Step 1: Resolve configuration
    let config = build_config(&args)?;
    let mut discover = AutoDiscover::from_config(&config)?;

    // Step 2: Reflect the input and decide what to describe
    let kind = input_kind(&args.input_path)?;
    let mut class = args.class.clone();
    let mut functions = args.functions.clone();
    let manifest;
    let source;
    let reflector: &dyn Reflector = match kind {
        InputKind::Manifest => {
            info!("Loading signature manifest...");
            manifest = ManifestReflector::load(&args.input_path)
                .with_context(|| format!("Failed to load manifest: {}", args.input_path.display()))?;
            if config.name.is_none() {
                if let Some(name) = &manifest.manifest().name {
                    discover.set_name(name);
                }
            }
            if class.is_none() && functions.is_empty() {
                let classes = manifest.class_names();
                if classes.len() > 1 {
                    anyhow::bail!(
                        "Manifest describes several classes ({}); choose one with --class",
                        classes.join(", ")
                    );
                }
                class = classes.first().map(|c| c.to_string());
                functions = manifest
                    .function_names()
                    .into_iter()
                    .map(String::from)
                    .collect();
            }
            &manifest
        }
        InputKind::SourceProject => {
            info!("Scanning and parsing project sources...");
            source = SourceReflector::from_directory(&args.input_path)?;
            info!("Parsed {} Rust files", source.files().len());
            if source.files().is_empty() {
                anyhow::bail!("No Rust files could be parsed in the project directory");
            }
            &source
        }
    };

    if config.uri.is_none() {
        let uri = discover.get_uri()?;
        warn!("No endpoint URI configured, using {}", uri);
    }

    // Step 3: Build the document
    if let Some(class) = &class {
        info!("Registering class {}...", class);
        discover
            .set_class(reflector, class)
            .with_context(|| format!("Failed to describe class {}", class))?;
    }
    if !functions.is_empty() {
        info!("Registering {} functions...", functions.len());
        let names: Vec<&str> = functions.iter().map(String::as_str).collect();
        discover
            .add_functions(reflector, &names)
            .context("Failed to describe functions")?;
    }

    // Step 4: Output to file or stdout
    let content = discover.to_xml()?;
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote WSDL document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Operations: {}", discover.functions().len());
    if let Ok(types) = discover.registered_types() {
        info!("  - Schema types: {}", types.len());
    }
    info!("  - Binding style: {}", discover.binding_style().style);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["wsdl-from-source"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_repeatable_functions() {
        let parsed = args(&["./svc", "-F", "add", "--function", "ping", "-s", "document"]);
        assert_eq!(parsed.functions, vec!["add", "ping"]);
        assert_eq!(parsed.style, Some(Style::Document));
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("wsdl.yaml");
        fs::write(
            &config_path,
            "strategy: any\nuri: http://file/soap\nbindingStyle:\n  style: rpc\n",
        )
        .unwrap();
        let config_arg = config_path.to_string_lossy().to_string();

        let parsed = args(&[
            "./svc",
            "--config",
            config_arg.as_str(),
            "--strategy",
            "sequence",
            "--use",
            "literal",
            "-u",
            "http://flag/soap",
        ]);
        let config = build_config(&parsed).unwrap();

        assert_eq!(config.strategy, StrategySetting::Named("sequence".to_string()));
        assert_eq!(config.uri.as_deref(), Some("http://flag/soap"));
        assert_eq!(config.binding_style.style, Some(Style::Rpc));
        assert_eq!(config.operation_body_style.use_kind, BodyUse::Literal);
        assert!(config.operation_body_style.encoding_style.is_none());
    }

    #[test]
    fn test_input_kind() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("services.yml");
        fs::write(&manifest, "functions: []").unwrap();
        let other = temp_dir.path().join("services.txt");
        fs::write(&other, "").unwrap();

        assert_eq!(input_kind(temp_dir.path()).unwrap(), InputKind::SourceProject);
        assert_eq!(input_kind(&manifest).unwrap(), InputKind::Manifest);
        assert!(input_kind(&other).is_err());
    }

    #[test]
    fn test_source_project_requires_selection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_string_lossy().to_string();

        assert!(parse_args_from_parsed(args(&[path.as_str()])).is_err());
        assert!(parse_args_from_parsed(args(&[path.as_str(), "-c", "Calculator"])).is_ok());
    }

    #[test]
    fn test_invalid_uri_flag_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_string_lossy().to_string();

        assert!(parse_args_from_parsed(args(&[path.as_str(), "-F", "add", "-u", "not a uri"])).is_err());
    }
}
