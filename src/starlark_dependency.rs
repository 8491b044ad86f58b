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

use super::{dependency::Dependency, include_directories::IncludeDirectories, starlark_fmt::format_strings};

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarDependency(#[allocative(skip)] pub(super) Arc<Dependency>);

impl fmt::Display for StarDependency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let targets = self.0.targets.iter().map(|x| x.target_name.clone()).collect::<Vec<_>>();
		write!(
			f,
			r#"Dependency{{
  name: "{}",
  found: {},
  targets: [{}],
  compile_args: [{}],
}}"#,
			self.0.name,
			self.0.found,
			format_strings(&targets),
			format_strings(&self.0.compile_args),
		)
	}
}

#[starlark::values::starlark_value(type = "Dependency")]
impl<'v> StarlarkValue<'v> for StarDependency {
	fn get_methods() -> Option<&'static Methods> {
		dependency_methods()
	}
}

starlark_simple_value!(StarDependency);

#[starlark_module]
fn dependency_methods_impl(builder: &mut MethodsBuilder) {
	fn found(this: &StarDependency) -> anyhow::Result<bool> {
		Ok(this.0.found)
	}

	fn name<'v>(this: &'v StarDependency, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.name))
	}
}

fn dependency_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(dependency_methods_impl)
}

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarIncludeDirectories(#[allocative(skip)] pub(super) Arc<IncludeDirectories>);

impl fmt::Display for StarIncludeDirectories {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"IncludeDirectories{{ name: \"{}\", dirs: [{}], is_system: {} }}",
			self.0.name,
			format_strings(&self.0.dirs),
			self.0.is_system
		)
	}
}

#[starlark::values::starlark_value(type = "IncludeDirectories")]
impl<'v> StarlarkValue<'v> for StarIncludeDirectories {}

starlark_simple_value!(StarIncludeDirectories);
