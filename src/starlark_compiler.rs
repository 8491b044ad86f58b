use core::fmt;

use allocative::Allocative;
use starlark::{
	environment::{
		Methods, //
		MethodsBuilder,
		MethodsStatic,
	},
	eval::Evaluator,
	starlark_module, //
	starlark_simple_value,
	values::{
		none::NoneType, //
		Heap,
		NoSerialize,
		ProvidesStaticType,
		StarlarkValue,
		StringValue,
		Value,
	},
};

use super::{
	capability::Compiler,
	config::MachineInfo,
	context::ModuleKind,
	program::Program,
	starlark_api::{err_msg, string_list, with_context},
	starlark_library::StarStaticLibrary,
	starlark_program::StarProgram,
};

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarCompiler(#[allocative(skip)] pub(super) Compiler);

impl fmt::Display for StarCompiler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Compiler{{ language: \"{}\", id: \"{}\" }}", self.0.language, self.0.id())
	}
}

#[starlark::values::starlark_value(type = "Compiler")]
impl<'v> StarlarkValue<'v> for StarCompiler {
	fn get_methods() -> Option<&'static Methods> {
		compiler_methods()
	}
}

starlark_simple_value!(StarCompiler);

#[starlark_module]
fn compiler_methods_impl(builder: &mut MethodsBuilder) {
	fn get_id<'v>(this: &'v StarCompiler, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(this.0.id()))
	}

	fn has_header(this: &StarCompiler, #[starlark(require = pos)] header: &str) -> anyhow::Result<bool> {
		Ok(this.0.has_header(header))
	}

	fn check_header(this: &StarCompiler, #[starlark(require = pos)] header: &str) -> anyhow::Result<bool> {
		Ok(this.0.has_header(header))
	}

	fn has_header_symbol(
		this: &StarCompiler,
		#[starlark(require = pos)] header: &str,
		#[starlark(require = pos)] symbol: &str,
	) -> anyhow::Result<bool> {
		Ok(this.0.has_header_symbol(header, symbol))
	}

	fn has_function(this: &StarCompiler, #[starlark(require = pos)] function: &str) -> anyhow::Result<bool> {
		Ok(this.0.has_function(function))
	}

	/// Link checks are keyed by `name`; the snippet itself is never compiled.
	fn links(
		this: &StarCompiler,
		#[starlark(require = pos)] code: &str,
		#[starlark(require = named)] name: Option<&str>,
	) -> anyhow::Result<bool> {
		Ok(this.0.links(name.unwrap_or(code)))
	}

	fn has_argument(this: &StarCompiler, #[starlark(require = pos)] argument: &str) -> anyhow::Result<bool> {
		log::info!("{} has_argument '{}': true", this.0.language, argument);
		Ok(true)
	}

	fn get_supported_arguments<'v>(
		this: &StarCompiler,
		#[starlark(require = pos)] arguments: Value<'v>,
	) -> anyhow::Result<Vec<String>> {
		let arguments = string_list(Some(arguments), "get_supported_arguments")?;
		log::info!("{} get_supported_arguments {:?}", this.0.language, arguments);
		Ok(arguments)
	}
}

fn compiler_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(compiler_methods_impl)
}

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarModule(#[allocative(skip)] pub(super) ModuleKind);

impl fmt::Display for StarModule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Module{{ {:?} }}", self.0)
	}
}

#[starlark::values::starlark_value(type = "Module")]
impl<'v> StarlarkValue<'v> for StarModule {
	fn get_methods() -> Option<&'static Methods> {
		module_methods()
	}
}

starlark_simple_value!(StarModule);

#[starlark_module]
fn module_methods_impl(builder: &mut MethodsBuilder) {
	fn find_installation<'v>(
		this: &'v StarModule,
		#[starlark(require = pos)] name: Option<&str>,
		heap: &'v Heap,
	) -> anyhow::Result<Value<'v>> {
		match this.0 {
			ModuleKind::Python => Ok(heap.alloc(StarProgram(Program::Tool(name.unwrap_or("python3").to_owned())))),
			ModuleKind::PkgConfig => err_msg("find_installation() is a python module method".to_owned()),
		}
	}

	/// Only `name` and the library matter; the other pkg-config fields are accepted and dropped.
	fn generate<'v>(
		this: &StarModule,
		#[starlark(require = pos)] library: Option<Value<'v>>,
		#[starlark(require = named)] name: Option<&str>,
		#[starlark(kwargs)] kwargs: Value<'v>,
		eval: &mut Evaluator<'v, '_>,
	) -> anyhow::Result<NoneType> {
		if this.0 != ModuleKind::PkgConfig {
			return err_msg("generate() is a pkgconfig module method".to_owned());
		}
		let library = match library {
			None => None,
			Some(x) => match StarStaticLibrary::from_value(x) {
				Some(lib) => Some(lib.0.clone()),
				None => {
					return err_msg(format!("pkgconfig.generate() expects a static library, got {}: {}", x.get_type(), x))
				}
			},
		};
		let name = match (name, &library) {
			(Some(x), _) => x.to_owned(),
			(None, Some(lib)) => lib.name.clone(),
			(None, None) => return err_msg("pkgconfig.generate() needs a library or a name".to_owned()),
		};
		log::debug!("pkgconfig.generate {} ignores {}", name, kwargs);
		with_context(eval, |ctx| {
			ctx.pkgconfig_generate(&name, library.as_deref()).or_else(err_msg)?;
			Ok(NoneType)
		})
	}
}

fn module_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(module_methods_impl)
}

/// `host_machine` in the build description.
#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarMachine(#[allocative(skip)] pub(super) MachineInfo);

impl fmt::Display for StarMachine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Machine{{ system: \"{}\", cpu_family: \"{}\", cpu: \"{}\" }}",
			self.0.host_machine, self.0.cpu_family, self.0.cpu
		)
	}
}

#[starlark::values::starlark_value(type = "Machine")]
impl<'v> StarlarkValue<'v> for StarMachine {
	fn get_methods() -> Option<&'static Methods> {
		machine_methods()
	}
}

starlark_simple_value!(StarMachine);

#[starlark_module]
fn machine_methods_impl(builder: &mut MethodsBuilder) {
	fn system<'v>(this: &'v StarMachine, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.host_machine))
	}

	fn cpu_family<'v>(this: &'v StarMachine, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.cpu_family))
	}

	fn cpu<'v>(this: &'v StarMachine, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.cpu))
	}
}

fn machine_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(machine_methods_impl)
}
