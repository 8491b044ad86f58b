use std::{cell::RefCell, sync::Arc};

use starlark::{
	environment::GlobalsBuilder,
	eval::Evaluator,
	starlark_module,
	values::{
		list::ListRef, //
		none::NoneType,
		ProvidesStaticType,
		Value,
	},
};

use crate::{
	command::CommandArg,
	config::OptionValue,
	context::RunContext,
	custom_target::CustomTarget,
	declare::{
		CustomTargetArgs, DeclareDependencyArgs, DependencyArgs, IncludeDirectoriesArgs, LibraryArgs,
		ProjectArgs, ProjectArgumentsArgs,
	},
	dependency::{Dependency, GeneratedSource},
	include_directories::IncludeDirectories,
	input::BuildInput,
	program::Program,
	starlark_compiler::{StarCompiler, StarModule},
	starlark_custom_target::{StarCustomTarget, StarCustomTargetItem},
	starlark_dependency::{StarDependency, StarIncludeDirectories},
	starlark_library::{StarSharedLibrary, StarStaticLibrary},
	starlark_program::{StarFile, StarProgram},
	static_library::StaticLibrary,
};

pub(super) fn err_msg<T>(msg: String) -> Result<T, anyhow::Error> {
	Err(anyhow::Error::msg(msg))
}

/// Carries the run context into the globals through `Evaluator::extra`.
#[derive(ProvidesStaticType)]
pub(crate) struct Interp {
	ctx: RefCell<RunContext>,
}

impl Interp {
	pub(crate) fn new(ctx: RunContext) -> Interp {
		Interp { ctx: RefCell::new(ctx) }
	}

	pub(crate) fn into_context(self) -> RunContext {
		self.ctx.into_inner()
	}
}

pub(super) fn with_context<R>(eval: &Evaluator, f: impl FnOnce(&mut RunContext) -> anyhow::Result<R>) -> anyhow::Result<R> {
	let interp = match eval.extra.and_then(|x| x.downcast_ref::<Interp>()) {
		Some(x) => x,
		None => return err_msg("Build description evaluated without a run context".to_owned()),
	};
	let mut ctx = interp.ctx.borrow_mut();
	f(&mut ctx)
}

/// Items of a list argument. A scalar counts as a one-item list and `None` as an empty one.
fn items(value: Option<Value>) -> Vec<Value> {
	match value {
		None => Vec::new(),
		Some(x) if x.is_none() => Vec::new(),
		Some(x) => match ListRef::from_value(x) {
			Some(list) => list.iter().collect(),
			None => vec![x],
		},
	}
}

pub(super) fn string_list(value: Option<Value>, what: &str) -> anyhow::Result<Vec<String>> {
	let mut ret = Vec::new();
	for item in items(value) {
		match item.unpack_str() {
			Some(x) => ret.push(x.to_owned()),
			None => return err_msg(format!("\"{}\" expects strings, got {}: {}", what, item.get_type(), item)),
		}
	}
	Ok(ret)
}

fn build_input(value: Value) -> anyhow::Result<BuildInput> {
	if let Some(x) = value.unpack_str() {
		return Ok(BuildInput::Str(x.to_owned()));
	}
	if let Some(x) = StarFile::from_value(value) {
		return Ok(BuildInput::File(x.0.clone()));
	}
	if let Some(x) = StarCustomTarget::from_value(value) {
		return Ok(BuildInput::CustomTarget(x.0.clone()));
	}
	if let Some(x) = StarCustomTargetItem::from_value(value) {
		return Ok(BuildInput::CustomTargetItem(x.0.clone()));
	}
	if let Some(list) = ListRef::from_value(value) {
		return Ok(BuildInput::List(list.iter().map(build_input).collect::<Result<_, _>>()?));
	}
	err_msg(format!("Unhandled input kind {}: {}", value.get_type(), value))
}

fn build_inputs(value: Option<Value>) -> anyhow::Result<Vec<BuildInput>> {
	items(value).into_iter().map(build_input).collect()
}

fn command_arg(value: Value) -> anyhow::Result<CommandArg> {
	if let Some(x) = value.unpack_str() {
		return Ok(CommandArg::Token(x.to_owned()));
	}
	if let Some(x) = value.unpack_i32() {
		return Ok(CommandArg::Token(x.to_string()));
	}
	if let Some(x) = StarFile::from_value(value) {
		return Ok(CommandArg::File(x.0.clone()));
	}
	if let Some(list) = ListRef::from_value(value) {
		return Ok(CommandArg::List(list.iter().map(command_arg).collect::<Result<_, _>>()?));
	}
	err_msg(format!("Unhandled command argument kind {}: {}", value.get_type(), value))
}

fn program(value: Value, relative_dir: &str) -> anyhow::Result<Program> {
	if let Some(x) = StarProgram::from_value(value) {
		return Ok(x.0.clone());
	}
	if let Some(x) = StarFile::from_value(value) {
		return Ok(Program::find(&x.0.path, ""));
	}
	match value.unpack_str() {
		Some(x) => Ok(Program::find(x, relative_dir)),
		None => err_msg(format!("Command must start with a program, got {}: {}", value.get_type(), value)),
	}
}

/// Splits `[program, "arg", ...]` into the program and the arguments that follow it.
fn program_with_arguments(value: Value) -> anyhow::Result<(Value, Vec<String>)> {
	let list = match ListRef::from_value(value) {
		Some(x) => x,
		None => return Ok((value, Vec::new())),
	};
	let (program, rest) = match list.content().split_first() {
		Some(x) => x,
		None => return err_msg("Command starts with an empty program list".to_owned()),
	};
	let mut args = Vec::new();
	for item in rest {
		match item.unpack_str() {
			Some(x) => args.push(x.to_owned()),
			None => return err_msg(format!("Program arguments must be strings, got {}: {}", item.get_type(), item)),
		}
	}
	Ok((*program, args))
}

fn static_libraries(value: Option<Value>, what: &str) -> anyhow::Result<Vec<Arc<StaticLibrary>>> {
	let mut ret = Vec::new();
	for item in items(value) {
		match StarStaticLibrary::from_value(item) {
			Some(x) => ret.push(x.0.clone()),
			None => return err_msg(format!("\"{}\" entry is not a static library: {} {}", what, item.get_type(), item)),
		}
	}
	Ok(ret)
}

fn dependencies(value: Option<Value>) -> anyhow::Result<Vec<Arc<Dependency>>> {
	let mut ret = Vec::new();
	for item in items(value) {
		match StarDependency::from_value(item) {
			Some(x) => ret.push(x.0.clone()),
			None => return err_msg(format!("Not a dependency: {} {}", item.get_type(), item)),
		}
	}
	Ok(ret)
}

fn custom_targets(value: Option<Value>) -> anyhow::Result<Vec<Arc<CustomTarget>>> {
	let mut ret = Vec::new();
	for item in items(value) {
		match StarCustomTarget::from_value(item) {
			Some(x) => ret.push(x.0.clone()),
			None => return err_msg(format!("\"depends\" entry is not a custom target: {} {}", item.get_type(), item)),
		}
	}
	Ok(ret)
}

fn generated_sources(value: Option<Value>) -> anyhow::Result<Vec<GeneratedSource>> {
	let mut ret = Vec::new();
	for item in items(value) {
		if let Some(x) = StarCustomTarget::from_value(item) {
			ret.push(GeneratedSource::Target(x.0.clone()));
		} else if let Some(x) = StarCustomTargetItem::from_value(item) {
			ret.push(GeneratedSource::Item(x.0.clone()));
		} else {
			return err_msg(format!("Unhandled dependency source kind {}: {}", item.get_type(), item));
		}
	}
	Ok(ret)
}

/// Include directory handles; plain strings are declared on the spot.
fn include_directories(value: Option<Value>, ctx: &mut RunContext) -> anyhow::Result<Vec<Arc<IncludeDirectories>>> {
	let mut ret = Vec::new();
	for item in items(value) {
		if let Some(x) = StarIncludeDirectories::from_value(item) {
			ret.push(x.0.clone());
		} else if let Some(x) = item.unpack_str() {
			let args = IncludeDirectoriesArgs { dirs: vec![x.to_owned()], is_system: false };
			ret.push(ctx.include_directories(args).or_else(err_msg)?);
		} else {
			return err_msg(format!("Not an include directory: {} {}", item.get_type(), item));
		}
	}
	Ok(ret)
}

#[allow(clippy::too_many_arguments)]
fn library_args(
	ctx: &mut RunContext,
	name: &str,
	sources: Option<Value>,
	c_args: Option<Value>,
	cpp_args: Option<Value>,
	dependencies_value: Option<Value>,
	include_directories_value: Option<Value>,
	link_with: Option<Value>,
	link_whole: Option<Value>,
) -> anyhow::Result<LibraryArgs> {
	Ok(LibraryArgs {
		name: name.to_owned(),
		sources: build_inputs(sources)?,
		c_args: string_list(c_args, "c_args")?,
		cpp_args: string_list(cpp_args, "cpp_args")?,
		dependencies: dependencies(dependencies_value)?,
		include_directories: include_directories(include_directories_value, ctx)?,
		link_with: static_libraries(link_with, "link_with")?,
		link_whole: static_libraries(link_whole, "link_whole")?,
	})
}

#[starlark_module]
pub(crate) fn build_api(builder: &mut GlobalsBuilder) {
	fn project<'v>(
		#[starlark(require = pos)] name: &str,
		#[starlark(require = named)] version: Option<&str>,
		#[starlark(require = named)] default_options: Option<Value<'v>>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<NoneType> {
		let args = ProjectArgs {
			name: name.to_owned(),
			version: version.unwrap_or_default().to_owned(),
			default_options: string_list(default_options, "default_options")?,
		};
		with_context(eval, |ctx| {
			ctx.project(args);
			Ok(NoneType)
		})
	}

	fn add_project_arguments<'v>(
		#[starlark(require = pos)] args: Value<'v>,
		#[starlark(require = named)] language: Option<Value<'v>>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<NoneType> {
		let mut project_args =
			ProjectArgumentsArgs { args: string_list(Some(args), "add_project_arguments")?, ..Default::default() };
		if language.is_some() {
			project_args.languages = string_list(language, "language")?;
		}
		with_context(eval, |ctx| {
			ctx.add_project_arguments(project_args).or_else(err_msg)?;
			Ok(NoneType)
		})
	}

	fn subdir<'v>(#[starlark(require = pos)] path: &str, eval: &mut Evaluator<'v, '_>) -> anyhow::Result<NoneType> {
		with_context(eval, |ctx| {
			ctx.subdir(path);
			Ok(NoneType)
		})
	}

	fn files<'v>(#[starlark(require = pos)] paths: Value<'v>, eval: &mut Evaluator<'v, '_>) -> anyhow::Result<Value<'v>> {
		let paths = string_list(Some(paths), "files")?;
		let files = with_context(eval, |ctx| Ok(ctx.files(&paths)))?;
		Ok(eval.heap().alloc(files.into_iter().map(StarFile).collect::<Vec<_>>()))
	}

	fn include_directories<'v>(
		#[starlark(require = pos)] dirs: Value<'v>,
		#[starlark(require = named)] is_system: Option<bool>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let args = IncludeDirectoriesArgs {
			dirs: string_list(Some(dirs), "include_directories")?,
			is_system: is_system.unwrap_or(false),
		};
		let inc = with_context(eval, |ctx| ctx.include_directories(args).or_else(err_msg))?;
		Ok(eval.heap().alloc(StarIncludeDirectories(inc)))
	}

	fn find_program<'v>(#[starlark(require = pos)] name: &str, eval: &mut Evaluator<'v, '_>) -> anyhow::Result<Value<'v>> {
		let program = with_context(eval, |ctx| Ok(ctx.find_program(name)))?;
		Ok(eval.heap().alloc(StarProgram(program)))
	}

	fn dependency<'v>(
		#[starlark(require = pos)] name: &str,
		#[starlark(require = named)] required: Option<bool>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let mut args = DependencyArgs { name: name.to_owned(), ..Default::default() };
		if let Some(required) = required {
			args.required = required;
		}
		let dep = with_context(eval, |ctx| ctx.dependency(args).or_else(err_msg))?;
		Ok(eval.heap().alloc(StarDependency(dep)))
	}

	fn declare_dependency<'v>(
		#[starlark(require = named)] sources: Option<Value<'v>>,
		#[starlark(require = named)] include_directories: Option<Value<'v>>,
		#[starlark(require = named)] link_with: Option<Value<'v>>,
		#[starlark(require = named)] link_whole: Option<Value<'v>>,
		#[starlark(require = named)] compile_args: Option<Value<'v>>,
		#[starlark(require = named)] dependencies: Option<Value<'v>>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let dep = with_context(eval, |ctx| {
			let args = DeclareDependencyArgs {
				sources: generated_sources(sources)?,
				include_directories: self::include_directories(include_directories, ctx)?,
				link_with: static_libraries(link_with, "link_with")?,
				link_whole: static_libraries(link_whole, "link_whole")?,
				compile_args: string_list(compile_args, "compile_args")?,
				dependencies: self::dependencies(dependencies)?,
			};
			Ok(ctx.declare_dependency(args))
		})?;
		Ok(eval.heap().alloc(StarDependency(dep)))
	}

	fn static_library<'v>(
		#[starlark(require = pos)] name: &str,
		#[starlark(require = pos)] sources: Option<Value<'v>>,
		#[starlark(require = named)] c_args: Option<Value<'v>>,
		#[starlark(require = named)] cpp_args: Option<Value<'v>>,
		#[starlark(require = named)] dependencies: Option<Value<'v>>,
		#[starlark(require = named)] include_directories: Option<Value<'v>>,
		#[starlark(require = named)] link_with: Option<Value<'v>>,
		#[starlark(require = named)] link_whole: Option<Value<'v>>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let lib = with_context(eval, |ctx| {
			let args = library_args(
				ctx,
				name,
				sources,
				c_args,
				cpp_args,
				dependencies,
				include_directories,
				link_with,
				link_whole,
			)?;
			ctx.static_library(args).or_else(err_msg)
		})?;
		Ok(eval.heap().alloc(StarStaticLibrary(lib)))
	}

	/// Same as `static_library`; libraries default to static.
	fn library<'v>(
		#[starlark(require = pos)] name: &str,
		#[starlark(require = pos)] sources: Option<Value<'v>>,
		#[starlark(require = named)] c_args: Option<Value<'v>>,
		#[starlark(require = named)] cpp_args: Option<Value<'v>>,
		#[starlark(require = named)] dependencies: Option<Value<'v>>,
		#[starlark(require = named)] include_directories: Option<Value<'v>>,
		#[starlark(require = named)] link_with: Option<Value<'v>>,
		#[starlark(require = named)] link_whole: Option<Value<'v>>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let lib = with_context(eval, |ctx| {
			let args = library_args(
				ctx,
				name,
				sources,
				c_args,
				cpp_args,
				dependencies,
				include_directories,
				link_with,
				link_whole,
			)?;
			ctx.static_library(args).or_else(err_msg)
		})?;
		Ok(eval.heap().alloc(StarStaticLibrary(lib)))
	}

	fn shared_library<'v>(
		#[starlark(require = pos)] name: &str,
		#[starlark(require = pos)] sources: Option<Value<'v>>,
		#[starlark(require = named)] c_args: Option<Value<'v>>,
		#[starlark(require = named)] cpp_args: Option<Value<'v>>,
		#[starlark(require = named)] dependencies: Option<Value<'v>>,
		#[starlark(require = named)] include_directories: Option<Value<'v>>,
		#[starlark(require = named)] link_with: Option<Value<'v>>,
		#[starlark(require = named)] link_whole: Option<Value<'v>>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let lib = with_context(eval, |ctx| {
			let args = library_args(
				ctx,
				name,
				sources,
				c_args,
				cpp_args,
				dependencies,
				include_directories,
				link_with,
				link_whole,
			)?;
			ctx.shared_library(args).or_else(err_msg)
		})?;
		Ok(eval.heap().alloc(StarSharedLibrary(lib)))
	}

	fn custom_target<'v>(
		#[starlark(require = pos)] name: &str,
		#[starlark(require = named)] command: Value<'v>,
		#[starlark(require = named)] output: Value<'v>,
		#[starlark(require = named)] input: Option<Value<'v>>,
		#[starlark(require = named)] depends: Option<Value<'v>>,
		#[starlark(require = named)] depend_files: Option<Value<'v>>,
		#[starlark(require = named)] capture: Option<bool>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<Value<'v>> {
		let command = items(Some(command));
		let target = with_context(eval, |ctx| {
			let (first, rest) = match command.split_first() {
				Some(x) => x,
				None => return err_msg(format!("Custom target \"{}\" has an empty command", name)),
			};
			let (program_value, program_args) = program_with_arguments(*first)?;
			let mut command = program_args.into_iter().map(CommandArg::Token).collect::<Vec<_>>();
			for item in rest {
				command.push(command_arg(*item)?);
			}
			let args = CustomTargetArgs {
				name: name.to_owned(),
				program: program(program_value, ctx.relative_dir())?,
				command,
				input: build_inputs(input)?,
				output: string_list(Some(output), "output")?,
				depends: custom_targets(depends)?,
				depend_files: build_inputs(depend_files)?,
				capture: capture.unwrap_or(false),
			};
			ctx.custom_target(args).or_else(err_msg)
		})?;
		Ok(eval.heap().alloc(StarCustomTarget(target)))
	}

	fn get_compiler<'v>(#[starlark(require = pos)] language: &str, eval: &mut Evaluator<'v, '_>) -> anyhow::Result<Value<'v>> {
		let compiler = with_context(eval, |ctx| ctx.get_compiler(language).or_else(err_msg))?;
		Ok(eval.heap().alloc(StarCompiler(compiler)))
	}

	fn get_option<'v>(#[starlark(require = pos)] name: &str, eval: &mut Evaluator<'v, '_>) -> anyhow::Result<Value<'v>> {
		let option = with_context(eval, |ctx| Ok(ctx.get_option(name)))?;
		let heap = eval.heap();
		Ok(match option {
			Some(OptionValue::Bool(x)) => Value::new_bool(x),
			Some(OptionValue::Int(x)) => heap.alloc(x),
			Some(OptionValue::Str(x)) => heap.alloc(x),
			None => {
				log::warn!("Option \"{}\" is not set in the project config", name);
				Value::new_none()
			}
		})
	}

	fn import_module<'v>(#[starlark(require = pos)] name: &str, eval: &mut Evaluator<'v, '_>) -> anyhow::Result<Value<'v>> {
		let module = with_context(eval, |ctx| ctx.import_module(name).or_else(err_msg))?;
		Ok(eval.heap().alloc(StarModule(module)))
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		context::tests::{test_context, SharedBuffer},
		evaluate,
		generator::Backend,
	};

	fn run(backend: Backend, host: &str, code: &str) -> (anyhow::Result<()>, SharedBuffer) {
		let (ctx, buffer) = test_context(backend, host);
		(evaluate("build.star", code.to_owned(), ctx), buffer)
	}

	#[test]
	fn test_program_with_arguments() {
		let code = r#"
py = import_module("python").find_installation()
custom_target("gen", output = "gen.h", command = [[py, "-B"], files("gen.py"), "@OUTPUT@"])
"#;
		let (res, buffer) = run(Backend::Bazel, "linux", code);
		res.unwrap();
		assert!(buffer.text().contains("  cmd = \"python3 -B $(location gen_gen.py) $(location gen.h)\",\n"));

		let (res, _) = run(Backend::Bazel, "linux", "custom_target(\"gen\", output = \"gen.h\", command = [[], \"x\"])\n");
		assert!(res.unwrap_err().to_string().contains("empty program list"));
	}

	#[test]
	fn test_pkgconfig_generate() {
		let code = r#"
util = static_library("vulkan_util", ["u.c"])
import_module("pkgconfig").generate(util, name = "vulkan_headers", description = "Vulkan headers")
"#;
		let (res, buffer) = run(Backend::Fuchsia, "fuchsia", code);
		res.unwrap();
		assert!(buffer.text().contains("# package library\ncc_library(\n  name = \"vulkan_headers\",\n"));

		let (res, _) = run(Backend::Fuchsia, "fuchsia", "import_module(\"pkgconfig\").generate()\n");
		assert!(res.unwrap_err().to_string().contains("needs a library or a name"));
	}
}
