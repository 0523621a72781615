use std::fs::File;
use std::path::PathBuf;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};
use tinytree::remapper::ClassRemapper;
use tinytree::tree::mappings::Mappings;
use tinytree::LoadOptions;

#[derive(Debug, Parser)]
#[command(version, about = "Inspect tiny mapping files and remap names with them")]
struct Cli {
	/// Be verbose.
	#[arg(short = 'v', long = "verbose")]
	verbose: bool,

	/// Leave out parameters, local variables and comments when reading.
	#[arg(long)]
	slim: bool,

	/// The mappings file, in tiny v2 or tiny v1 format.
	mappings: PathBuf,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Prints the header and the number of elements.
	Info,
	/// Maps a class name into another namespace.
	Class {
		name: String,
		#[arg(long)]
		to: String,
		/// Defaults to the first namespace.
		#[arg(long)]
		from: Option<String>,
	},
	/// Maps all class names in a field or method descriptor into another namespace.
	Desc {
		desc: String,
		#[arg(long)]
		to: String,
		/// Defaults to the first namespace.
		#[arg(long)]
		from: Option<String>,
	},
}

fn setup_logging(verbose: bool) -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(if verbose { LevelFilter::Trace } else { LevelFilter::Info })
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up logging")
}

fn first_namespace(mappings: &Mappings, from: Option<String>) -> Result<String> {
	match from {
		Some(from) => Ok(from),
		None => mappings.metadata().namespaces.names()
			.next()
			.map(String::from)
			.context("mappings have no namespaces"),
	}
}

fn info(mappings: &Mappings) {
	let metadata = mappings.metadata();

	println!("version: {}.{}", metadata.major_version, metadata.minor_version);
	println!("namespaces: {:?}", metadata.namespaces);
	for (key, value) in &metadata.properties {
		match value {
			Some(value) => println!("property: {key} = {value}"),
			None => println!("property: {key}"),
		}
	}

	let classes = mappings.classes().values();
	let fields: usize = classes.clone().map(|class| class.fields.len()).sum();
	let methods: usize = classes.clone().map(|class| class.methods.len()).sum();
	let parameters: usize = classes.flat_map(|class| &class.methods).map(|method| method.parameters.len()).sum();

	println!("classes: {}", mappings.classes().len());
	println!("fields: {fields}");
	println!("methods: {methods}");
	println!("parameters: {parameters}");
}

fn main() -> Result<()> {
	let Cli { verbose, slim, mappings: path, command } = Cli::parse();

	setup_logging(verbose)?;

	let file = File::open(&path)
		.with_context(|| anyhow!("failed to open mappings file {path:?}"))?;
	let mappings = tinytree::read_with_detection_with(file, LoadOptions { slim })
		.with_context(|| anyhow!("failed to read mappings file {path:?}"))?;

	info!("read {} classes from {path:?}", mappings.classes().len());

	match command {
		Command::Info => info(&mappings),
		Command::Class { name, to, from } => {
			let from = first_namespace(&mappings, from)?;
			debug!("mapping class {name:?} from {from:?} to {to:?}");

			let remapper = mappings.remapper(&from, &to)?;
			println!("{}", remapper.map_class_any(&name));
		},
		Command::Desc { desc, to, from } => {
			let from = first_namespace(&mappings, from)?;
			debug!("mapping descriptor {desc:?} from {from:?} to {to:?}");

			let remapper = mappings.remapper(&from, &to)?;
			println!("{}", remapper.map_desc(&desc));
		},
	}

	Ok(())
}
