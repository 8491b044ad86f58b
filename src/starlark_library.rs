use core::fmt;
use std::sync::Arc;

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

use super::{
	starlark_fmt::format_strings,
	static_library::{SharedLibrary, StaticLibrary},
};

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarStaticLibrary(#[allocative(skip)] pub(super) Arc<StaticLibrary>);

impl fmt::Display for StarStaticLibrary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let names = |libs: &[Arc<StaticLibrary>]| libs.iter().map(|x| x.name.clone()).collect::<Vec<_>>();
		write!(
			f,
			r#"StaticLibrary{{
  name: "{}",
  link_with: [{}],
  link_whole: [{}],
}}"#,
			self.0.name,
			format_strings(&names(&self.0.link_with)),
			format_strings(&names(&self.0.link_whole)),
		)
	}
}

#[starlark::values::starlark_value(type = "StaticLibrary")]
impl<'v> StarlarkValue<'v> for StarStaticLibrary {
	fn get_methods() -> Option<&'static Methods> {
		static_library_methods()
	}
}

starlark_simple_value!(StarStaticLibrary);

#[starlark_module]
fn static_library_methods_impl(builder: &mut MethodsBuilder) {
	fn name<'v>(this: &'v StarStaticLibrary, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.name))
	}
}

fn static_library_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(static_library_methods_impl)
}

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarSharedLibrary(#[allocative(skip)] pub(super) Arc<SharedLibrary>);

impl fmt::Display for StarSharedLibrary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SharedLibrary{{ name: \"{}\" }}", self.0.name)
	}
}

#[starlark::values::starlark_value(type = "SharedLibrary")]
impl<'v> StarlarkValue<'v> for StarSharedLibrary {
	fn get_methods() -> Option<&'static Methods> {
		shared_library_methods()
	}
}

starlark_simple_value!(StarSharedLibrary);

#[starlark_module]
fn shared_library_methods_impl(builder: &mut MethodsBuilder) {
	fn name<'v>(this: &'v StarSharedLibrary, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.name))
	}
}

fn shared_library_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(shared_library_methods_impl)
}
