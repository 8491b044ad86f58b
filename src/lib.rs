pub mod capability;
pub mod classify;
pub mod command;
pub mod config;
pub mod context;
pub mod custom_target;
pub mod declare;
pub mod dependency;
pub mod generator;
pub mod include_directories;
pub mod input;
mod misc;
pub mod program;
pub mod project;
mod starlark_api;
mod starlark_compiler;
mod starlark_custom_target;
mod starlark_dependency;
mod starlark_fmt;
mod starlark_library;
mod starlark_program;
pub mod static_library;

use std::{
	fs, //
	io::BufWriter,
	path::PathBuf,
};

use starlark::{
	environment::{
		GlobalsBuilder, //
		Module,
	},
	eval::Evaluator,
	syntax::{
		AstModule, //
		Dialect,
	},
};

use config::read_config;
use context::RunContext;
use generator::Backend;
use starlark_api::{build_api, err_msg, Interp};
use starlark_compiler::StarMachine;

/// Inputs of one translation run.
#[derive(Clone, Debug)]
pub struct TranslateOptions {
	pub config: PathBuf,
	pub build_file: PathBuf,
	/// Root the build description's paths are relative to.
	pub source_dir: PathBuf,
	pub output_dir: PathBuf,
	/// Which `[[project_config]]` table is active.
	pub config_index: usize,
}

/// Translates the build description and returns the path of the written build file.
pub fn translate(opts: &TranslateOptions) -> Result<PathBuf, anyhow::Error> {
	let config_file = read_config(&opts.config).or_else(err_msg)?;
	let build = config_file.build.clone();
	let config = config_file.select(opts.config_index).or_else(err_msg)?;
	let backend = Backend::select(&build, config.host()).or_else(err_msg)?;
	log::info!("Translating for {} ({:?}, host {})", config.name, backend, config.host());

	let code = match fs::read_to_string(&opts.build_file) {
		Ok(x) => x,
		Err(e) => return err_msg(format!("Error reading {}: {}", opts.build_file.display(), e)),
	};

	if let Err(e) = fs::create_dir_all(&opts.output_dir) {
		return err_msg(format!("Error creating {}: {}", opts.output_dir.display(), e));
	}
	let output_path = opts.output_dir.join(backend.output_filename());
	let output = match fs::File::create(&output_path) {
		Ok(x) => x,
		Err(e) => return err_msg(format!("Error creating {}: {}", output_path.display(), e)),
	};

	let ctx = RunContext::new(config, backend, opts.source_dir.clone(), Box::new(BufWriter::new(output)));
	evaluate(&opts.build_file.to_string_lossy(), code, ctx)?;
	log::info!("Wrote {}", output_path.display());
	Ok(output_path)
}

/// Evaluates a build description against `ctx`, emitting every rule into its output.
pub fn evaluate(name: &str, code: String, ctx: RunContext) -> Result<(), anyhow::Error> {
	let ast = match AstModule::parse(name, code, &Dialect::Extended) {
		Ok(x) => x,
		Err(e) => return err_msg(e.to_string()),
	};
	let globals = GlobalsBuilder::standard().with(build_api).build();

	let module = Module::new();
	let host_machine = module.heap().alloc(StarMachine(ctx.config().host_machine.clone()));
	module.set("host_machine", host_machine);

	let interp = Interp::new(ctx);
	{
		let mut eval = Evaluator::new(&module);
		eval.extra = Some(&interp);
		if let Err(e) = eval.eval_module(ast, &globals) {
			return err_msg(e.to_string());
		}
	}
	interp.into_context().finish().or_else(err_msg)
}
