use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use apollo_schema_builder::{
    BuiltObjectType, DataObjectCatalog, DataObjectModel, FieldConfig, ModelType, ObjectType,
    OperationRegistry, ResolverRegistry,
};
use clap::Parser;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing_subscriber::EnvFilter;

/// CLI arguments. See <https://docs.rs/clap/latest/clap/_derive/index.html>
#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Builds a single field and prints it as SDL along with its resolver
    Field {
        /// Compact field definition, e.g. `posts(limit: Int = 10)`
        definition: String,
        /// Field configuration as JSON: a type string or a mapping
        #[arg(long, default_value = "null")]
        config: String,
        /// Name of the object type the field is added to
        #[arg(long, default_value = "Query")]
        type_name: String,
    },
    /// Builds the object type for a data object class from a JSON catalog
    Model {
        /// The path to the catalog file
        catalog: PathBuf,
        /// The data object class to build
        class: String,
        /// Also add every field the catalog knows a type for
        #[arg(long)]
        all_fields: bool,
        /// Operation identifiers to create root fields for, e.g. `read`
        #[arg(long = "operation")]
        operations: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let result = match args.command {
        Command::Field {
            definition,
            config,
            type_name,
        } => build_field(&definition, &config, &type_name),
        Command::Model {
            catalog,
            class,
            all_fields,
            operations,
        } => build_model(catalog, class, all_fields, &operations),
    };
    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn build_field(definition: &str, config: &str, type_name: &str) -> Result<String, String> {
    let config = serde_json::from_str::<JsonValue>(config)
        .map_err(|err| format!("Invalid --config JSON: {err}"))?;
    let config = FieldConfig::from_json(config)
        .ok_or_else(|| "--config must be a type string or a JSON object".to_owned())?;
    let mut object_type = ObjectType::new(type_name, Arc::new(ResolverRegistry::default()));
    object_type
        .create_field(definition, config)
        .map_err(|err| err.to_string())?;
    let built = object_type.build().map_err(|err| err.to_string())?;
    Ok(render(&built))
}

fn build_model(
    catalog: PathBuf,
    class: String,
    all_fields: bool,
    operations: &[String],
) -> Result<String, String> {
    let input = fs::read_to_string(&catalog)
        .map_err(|err| format!("Cannot read {}: {err}", catalog.display()))?;
    let catalog: DataObjectCatalog =
        serde_json::from_str(&input).map_err(|err| format!("Invalid catalog: {err}"))?;
    let model = DataObjectModel::new(
        class,
        Arc::new(catalog),
        Arc::new(OperationRegistry::default()),
    )
    .map_err(|err| err.to_string())?;
    let resolvers = Arc::new(ResolverRegistry::default());
    let mut model_type =
        ModelType::new(Arc::new(model), resolvers.clone()).map_err(|err| err.to_string())?;
    if all_fields {
        model_type.add_all_fields().map_err(|err| err.to_string())?;
    }
    for operation in operations {
        model_type
            .add_operation(operation, &JsonMap::new())
            .map_err(|err| err.to_string())?;
    }

    let mut output = vec![render(&model_type.build().map_err(|err| err.to_string())?)];
    let mut query = ObjectType::new("Query", resolvers.clone());
    let mut mutation = ObjectType::new("Mutation", resolvers);
    model_type.apply_operations(&mut query, &mut mutation);
    for root in [query, mutation] {
        if root.fields().next().is_some() {
            output.push(render(&root.build().map_err(|err| err.to_string())?));
        }
    }
    Ok(output.join("\n"))
}

fn render(built: &BuiltObjectType) -> String {
    let mut output = built.to_sdl();
    for (field, resolver) in &built.resolvers {
        output.push_str(&format!(
            "# {}.{field} => {resolver}\n",
            built.definition.name
        ));
    }
    output
}
