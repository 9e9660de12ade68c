use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use jsonschema_bean_gen::config::{DEFAULT_NAMESPACE, ENUM_STYLE, EnumStyle, IGNORE_MISSING_TYPES};
use jsonschema_bean_gen::engine::Engine;
use jsonschema_bean_gen::error::{Error, Result};
use jsonschema_bean_gen::loader::{DirectoryLoader, LoaderChain, PreloadedLoader, schema_file_uri};
use jsonschema_bean_gen::mapping::MappingFile;
use jsonschema_bean_gen::output::DirectoryOutput;

/// Generate Java bean sources from JSON Schema.
///
/// Reads the given schema files, follows their $ref graphs, and writes one
/// Java source file per generated type.
#[derive(Parser)]
#[command(name = "jsonschema-bean-gen", version, about)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Java sources for schema files.
    Generate {
        /// URI the base directory is published under.
        ///
        /// Defaults to the base directory's file: URL.
        #[arg(long, env = "JSONSCHEMA_ROOT_URI")]
        root: Option<String>,

        /// Directory containing the schema files.
        #[arg(long, default_value = ".")]
        base_directory: PathBuf,

        /// JSON mapping file pinning schema locations to types. Repeatable.
        #[arg(long = "mapping")]
        mappings: Vec<PathBuf>,

        /// Output directory for generated sources.
        #[arg(long, default_value = ".")]
        output_directory: PathBuf,

        /// Package for types without a mapping.
        #[arg(long, env = "JSONSCHEMA_DEFAULT_NAMESPACE")]
        default_namespace: Option<String>,

        /// How string enums are emitted: "native" or "constants".
        #[arg(long)]
        enum_style: Option<EnumStyle>,

        /// Assume types that fail to generate exist anyway.
        #[arg(long)]
        ignore_missing_types: bool,

        /// Fully-qualified name of a type that already exists. Repeatable.
        #[arg(long = "existing-type")]
        existing_types: Vec<String>,

        /// Set an engine feature, e.g. --feature simple-plain-types=true. Repeatable.
        #[arg(long = "feature", value_name = "KEY=VALUE")]
        features: Vec<String>,

        /// Schema files to generate types for.
        #[arg(required = true)]
        schemas: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            root,
            base_directory,
            mappings,
            output_directory,
            default_namespace,
            enum_style,
            ignore_missing_types,
            existing_types,
            features,
            schemas,
        } => {
            let root = root_uri(root.as_deref(), &base_directory)?;
            tracing::debug!("{root}: served from {}", base_directory.display());

            let mut preloaded = PreloadedLoader::default();
            let mut initial = Vec::with_capacity(schemas.len());
            for schema in &schemas {
                let mut uri = schema_file_uri(&root, &base_directory, schema)?;
                preloaded.preload_file(&uri, schema)?;
                uri.set_fragment(Some(""));
                initial.push(uri);
            }

            let loader = LoaderChain::default()
                .with(preloaded)
                .with(DirectoryLoader::new(root.clone(), &base_directory));
            #[cfg(feature = "download")]
            let loader = loader.with(jsonschema_bean_gen::loader::HttpLoader::new()?);

            let mut engine = Engine::new(loader, DirectoryOutput::new(&output_directory));

            for path in &mappings {
                let mut file = MappingFile::load(path)?;
                if file.base_uri.is_none() {
                    file.base_uri = Some(root.to_string());
                }
                for mapping in file.resolve()? {
                    engine.add_mapping(mapping);
                }
            }

            for feature in &features {
                let (key, value) = feature.split_once('=').ok_or_else(|| {
                    Error::Config(format!("feature '{feature}' is not of the form KEY=VALUE"))
                })?;
                engine.features_mut().set_raw(key.trim(), value.trim())?;
            }
            if let Some(namespace) = default_namespace {
                engine.set_feature(&DEFAULT_NAMESPACE, namespace);
            }
            if let Some(style) = enum_style {
                engine.set_feature(&ENUM_STYLE, style);
            }
            if ignore_missing_types {
                engine.set_feature(&IGNORE_MISSING_TYPES, true);
            }
            for existing in existing_types {
                engine.known_types_mut().register(existing);
            }

            for (uri, type_ref) in engine.generate_all(&initial)? {
                match type_ref {
                    Some(type_ref) => eprintln!("{uri}: {type_ref}"),
                    None => eprintln!("{uri}: no type"),
                }
            }
        }
    }

    Ok(())
}

/// The root URI, always ending in `/` so relative paths resolve below it.
fn root_uri(root: Option<&str>, base_directory: &std::path::Path) -> Result<Url> {
    let mut root = match root {
        Some(root) => Url::parse(root).map_err(|source| Error::InvalidUri {
            uri: root.to_string(),
            source,
        })?,
        None => {
            let absolute = std::path::absolute(base_directory).map_err(|e| Error::Read {
                path: base_directory.to_path_buf(),
                source: e,
            })?;
            Url::from_directory_path(&absolute).map_err(|()| {
                Error::Config(format!("cannot express {} as a URI", absolute.display()))
            })?
        }
    };
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    Ok(root)
}
