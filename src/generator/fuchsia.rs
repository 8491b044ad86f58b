use std::{
	collections::BTreeSet, //
	sync::Arc,
};

use super::{
	bazel::{library_lines, package_library_lines, Bazel},
	Emitter, GenRule, Invocation, LibraryRule, PythonBinary,
};
use crate::{
	custom_target::{CustomTarget, CustomTargetItem},
	program::Program,
};

const FUCHSIA_PLATFORM: &str = "@platforms//os:fuchsia";

/// Bazel rules restricted to Fuchsia targets.
pub(super) struct Fuchsia;

impl Emitter for Fuchsia {
	fn gen_dir_marker(&self) -> &'static str {
		Bazel.gen_dir_marker()
	}

	fn splits_headers(&self) -> bool {
		Bazel.splits_headers()
	}

	fn expands_project_build_root(&self) -> bool {
		Bazel.expands_project_build_root()
	}

	fn globs_local_headers(&self) -> bool {
		Bazel.globs_local_headers()
	}

	fn target_references(&self, target: &CustomTarget) -> Vec<String> {
		Bazel.target_references(target)
	}

	fn item_reference(&self, item: &CustomTargetItem) -> String {
		Bazel.item_reference(item)
	}

	fn program_invocation(&self, program: &Program) -> Invocation {
		Bazel.program_invocation(program)
	}

	fn script_environment(&self, script: &str, depends: &[Arc<CustomTarget>]) -> Option<String> {
		Bazel.script_environment(script, depends)
	}

	fn include_directories(&self, name: &str, header_dirs: &BTreeSet<String>) -> Vec<String> {
		Bazel.include_directories(name, header_dirs)
	}

	fn library(&self, rule: &LibraryRule) -> Result<Vec<String>, String> {
		library_lines(rule, Some(FUCHSIA_PLATFORM))
	}

	fn python_binary(&self, binary: &PythonBinary) -> Vec<String> {
		Bazel.python_binary(binary)
	}

	fn genrule(&self, rule: &GenRule) -> Vec<String> {
		Bazel.genrule(rule)
	}

	fn package_library(&self, name: &str, library: &str) -> Vec<String> {
		package_library_lines(name, library)
	}
}

#[test]
fn test_fuchsia_library_constraint() {
	use crate::{
		classify::partition_sources, dependency::ResolvedDependencies, generator::LibraryKind, input::BuildInput,
		static_library::LinkClosure,
	};

	let rule = LibraryRule {
		name: "vulkan_radeon".to_owned(),
		kind: LibraryKind::Shared,
		relative_dir: String::new(),
		sources: partition_sources(&[BuildInput::Str("radv.c".to_owned())], "", false),
		c_std: None,
		cpp_std: None,
		c_flags: vec!["-Wno-error".to_owned()],
		cpp_flags: vec!["-Wno-error".to_owned()],
		include_dirs: Vec::new(),
		include_rules: BTreeSet::new(),
		links: LinkClosure::default(),
		deps: ResolvedDependencies::default(),
		local_header_dirs: vec![String::new()],
	};
	let lines = Fuchsia.library(&rule).unwrap();
	let constraint = lines.iter().position(|x| x == "  target_compatible_with = [ \"@platforms//os:fuchsia\" ],");
	let visibility = lines.iter().position(|x| x == "  visibility = [ \"//visibility:public\" ],");
	assert!(constraint.is_some());
	assert_eq!(constraint.map(|x| x + 1), visibility);
	assert!(lines.contains(&"    \"*.h\",".to_owned()));
	assert!(lines.contains(&"    \"-I .\",".to_owned()));
	assert!(lines.contains(&"cc_shared_library(".to_owned()));

	let mut bazel_lines = Bazel.library(&rule).unwrap();
	bazel_lines.retain(|x| !x.contains("target_compatible_with"));
	let mut fuchsia_lines = lines.clone();
	fuchsia_lines.retain(|x| !x.contains("target_compatible_with"));
	assert_eq!(bazel_lines, fuchsia_lines);
	assert_eq!(Fuchsia.gen_dir_marker(), "$(GENDIR)");
}

#[test]
fn test_package_library() {
	assert_eq!(
		Fuchsia.package_library("vulkan_headers", "vulkan_util"),
		vec![
			"# package library",
			"cc_library(",
			"  name = \"vulkan_headers\",",
			"  deps = [",
			"    \"vulkan_util\",",
			"  ],",
			"  includes = [ \".\" ],",
			"  visibility = [ \"//visibility:public\" ],",
			")",
		]
	);
	assert!(Bazel.package_library("vulkan_headers", "vulkan_util").is_empty());
}
