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
		Value,
	},
};

use super::{
	custom_target::{CustomTarget, CustomTargetItem},
	starlark_api::err_msg,
	starlark_fmt::format_strings,
};

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarCustomTarget(#[allocative(skip)] pub(super) Arc<CustomTarget>);

impl fmt::Display for StarCustomTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			r#"CustomTarget{{
  name: "{}",
  outputs: [{}],
  rules: [{}],
}}"#,
			self.0.name,
			format_strings(&self.0.outputs),
			format_strings(&self.0.rule_names()),
		)
	}
}

#[starlark::values::starlark_value(type = "CustomTarget")]
impl<'v> StarlarkValue<'v> for StarCustomTarget {
	fn get_methods() -> Option<&'static Methods> {
		custom_target_methods()
	}
}

starlark_simple_value!(StarCustomTarget);

fn output_item<'v>(target: &Arc<CustomTarget>, index: i32, heap: &'v Heap) -> anyhow::Result<Value<'v>> {
	let index = match usize::try_from(index) {
		Ok(x) => x,
		Err(_) => return err_msg(format!("Negative output index {} of \"{}\"", index, target.name)),
	};
	match CustomTargetItem::new(target.clone(), index) {
		Ok(item) => Ok(heap.alloc(StarCustomTargetItem(item))),
		Err(e) => err_msg(e),
	}
}

#[starlark_module]
fn custom_target_methods_impl(builder: &mut MethodsBuilder) {
	fn name<'v>(this: &'v StarCustomTarget, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(&this.0.name))
	}

	fn output<'v>(
		this: &'v StarCustomTarget,
		#[starlark(require = pos)] index: i32,
		heap: &'v Heap,
	) -> anyhow::Result<Value<'v>> {
		output_item(&this.0, index, heap)
	}
}

fn custom_target_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(custom_target_methods_impl)
}

#[derive(Clone, Debug, ProvidesStaticType, NoSerialize, Allocative)]
pub(super) struct StarCustomTargetItem(#[allocative(skip)] pub(super) CustomTargetItem);

impl fmt::Display for StarCustomTargetItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "CustomTargetItem{{ target: \"{}\", output: \"{}\" }}", self.0.target.name, self.0.output())
	}
}

#[starlark::values::starlark_value(type = "CustomTargetItem")]
impl<'v> StarlarkValue<'v> for StarCustomTargetItem {
	fn get_methods() -> Option<&'static Methods> {
		custom_target_item_methods()
	}
}

starlark_simple_value!(StarCustomTargetItem);

#[starlark_module]
fn custom_target_item_methods_impl(builder: &mut MethodsBuilder) {
	fn full_path<'v>(this: &'v StarCustomTargetItem, heap: &'v Heap) -> anyhow::Result<StringValue<'v>> {
		Ok(heap.alloc_str(this.0.output()))
	}
}

fn custom_target_item_methods() -> Option<&'static Methods> {
	static RES: MethodsStatic = MethodsStatic::new();
	RES.methods(custom_target_item_methods_impl)
}
