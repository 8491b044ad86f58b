use core::fmt;

use allocative::Allocative;
use starlark::{
	environment::{
		Methods, //
		MethodsBuilder,
		MethodsStatic,
	},
	starlark_module, //
	starlark_simple_value,
	values::{
		Heap, //
		NoSerialize,
		ProvidesStaticType,
		StarlarkValue,
		StringValue,
	},
};

use super::{input::File, program::Program};

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarProgram(#[allocative(skip)] pub(super) Program);

impl fmt::Display for StarProgram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0 {
			Program::Tool(x) => write!(f, "Program{{ tool: \"{}\" }}", x),
			Program::Script(x) => write!(f, "Program{{ script: \"{}\" }}", x),
		}
	}
}

#[starlark::values::starlark_value(type = "Program")]
impl<'v> StarlarkValue<'v> for StarProgram {
	fn get_methods() -> Option<&'static Methods> {
		program_methods()
	}
}

starlark_simple_value!(StarProgram);

#[starlark_module]
fn program_methods_impl(builder: &mut MethodsBuilder) {
	fn found(this: &StarProgram) -> anyhow::Result<bool> {
		Ok(this.0.found())
	}

	fn full_path<'v>(this: &'v StarProgram, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(this.0.command()))
	}
}

fn program_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(program_methods_impl)
}

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarFile(#[allocative(skip)] pub(super) File);

impl fmt::Display for StarFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "File{{ path: \"{}\" }}", self.0.path)
	}
}

#[starlark::values::starlark_value(type = "File")]
impl<'v> StarlarkValue<'v> for StarFile {}

starlark_simple_value!(StarFile);
