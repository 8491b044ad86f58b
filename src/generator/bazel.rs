use std::{
	collections::BTreeSet, //
	sync::Arc,
};

use super::{escape_cmd, location, push_list, Emitter, GenRule, Invocation, LibraryKind, LibraryRule, PythonBinary};
use crate::{
	custom_target::{CustomTarget, CustomTargetItem},
	misc::{dirname, display_dir, join_relative},
	program::Program,
};

const VISIBILITY: &str = "  visibility = [ \"//visibility:public\" ],";

/// Flags sit inside single quotes in the emitted file.
fn escape_flag(flag: &str) -> String {
	flag.replace('"', "\\\\\"")
}

fn glob_lines(lines: &mut Vec<String>, patterns: &[String]) {
	for pattern in patterns {
		lines.push(format!("    \"{}\",", pattern));
	}
	lines.push("  ]),".to_owned());
}

fn header_lines(lines: &mut Vec<String>, header_files: &BTreeSet<String>, globs: &[String]) {
	if header_files.is_empty() {
		lines.push("  hdrs = glob([".to_owned());
	} else {
		lines.push("  hdrs = [".to_owned());
		for hdr in header_files {
			lines.push(format!("    \"{}\",", hdr));
		}
		lines.push("  ] + glob([".to_owned());
	}
	glob_lines(lines, globs);
}

/// `cc_library` (plus a `cc_shared_library` wrapper for shared libraries). Fuchsia passes its
/// platform constraint as `target_compatible_with`.
pub(super) fn library_lines(rule: &LibraryRule, compatible_with: Option<&str>) -> Result<Vec<String>, String> {
	if let Some(header_lib) = rule.deps.header_libs.iter().next() {
		return Err(format!(
			"Header library \"{}\" used by \"{}\" is not supported by Bazel",
			header_lib, rule.name
		));
	}
	let cc_name = match rule.kind {
		LibraryKind::Static => {
			for shared in &rule.deps.shared_libs {
				log::warn!("Static library \"{}\" can't depend on shared library \"{}\"; dropped", rule.name, shared);
			}
			rule.name.clone()
		}
		LibraryKind::Shared => format!("_{}", rule.name),
	};

	let mut lines = vec!["cc_library(".to_owned(), format!("  name = \"{}\",", cc_name)];
	push_list(&mut lines, "srcs = [", &rule.sources.sources);

	let header_globs = rule
		.local_header_dirs
		.iter()
		.map(|x| join_relative(x, "*.h"))
		.collect::<Vec<_>>();
	header_lines(&mut lines, &rule.deps.generated_header_files, &header_globs);

	let mut copts = Vec::new();
	for dir in [&rule.relative_dir].into_iter().chain(&rule.include_dirs) {
		copts.push(format!("\"-I {}\"", display_dir(dir)));
		copts.push(format!("\"-I $(GENDIR)/{}\"", display_dir(dir)));
	}
	let flags = if rule.sources.has_c_sources() { &rule.c_flags } else { &rule.cpp_flags };
	for flag in flags {
		copts.push(format!("'{}'", escape_flag(flag)));
	}
	lines.push("  copts = [".to_owned());
	lines.extend(copts.into_iter().map(|x| format!("    {},", x)));
	lines.push("  ],".to_owned());

	let mut deps = rule.static_libs();
	deps.extend(rule.whole_static_libs());
	deps.extend(rule.include_rules.iter().cloned());
	deps.extend(rule.generated_headers());
	deps.extend(rule.sources.generated_sources.iter().cloned());
	push_list(&mut lines, "deps = [", &deps);

	if let Some(platform) = compatible_with {
		lines.push(format!("  target_compatible_with = [ \"{}\" ],", platform));
	}
	lines.push(VISIBILITY.to_owned());
	lines.push(")".to_owned());

	if rule.kind == LibraryKind::Shared {
		lines.push("cc_shared_library(".to_owned());
		lines.push(format!("  name = \"{}\",", rule.name));
		push_list(&mut lines, "deps = [", [&cc_name]);
		push_list(&mut lines, "dynamic_deps = [", &rule.deps.shared_libs);
		lines.push(")".to_owned());
	}
	Ok(lines)
}

/// Bazel `BUILD.bazel` for any host but Fuchsia.
/// Header-only wrapper exposing `library` under a package name. `includes` makes dependents
/// use `-isystem`, so package headers resolve with angle brackets.
pub(super) fn package_library_lines(name: &str, library: &str) -> Vec<String> {
	let mut lines = vec!["# package library".to_owned(), "cc_library(".to_owned(), format!("  name = \"{}\",", name)];
	push_list(&mut lines, "deps = [", [library]);
	lines.push("  includes = [ \".\" ],".to_owned());
	lines.push(VISIBILITY.to_owned());
	lines.push(")".to_owned());
	lines
}

pub(super) struct Bazel;

impl Emitter for Bazel {
	fn gen_dir_marker(&self) -> &'static str {
		"$(GENDIR)"
	}

	fn splits_headers(&self) -> bool {
		false
	}

	fn expands_project_build_root(&self) -> bool {
		true
	}

	fn globs_local_headers(&self) -> bool {
		true
	}

	fn target_references(&self, target: &CustomTarget) -> Vec<String> {
		vec![format!(":{}", target.name)]
	}

	fn item_reference(&self, item: &CustomTargetItem) -> String {
		item.output().to_owned()
	}

	fn program_invocation(&self, program: &Program) -> Invocation {
		match program {
			Program::Tool(tool) => Invocation { command: tool.clone(), tools: Vec::new() },
			Program::Script(script) => Invocation { command: location(script), tools: Vec::new() },
		}
	}

	fn script_environment(&self, _script: &str, _depends: &[Arc<CustomTarget>]) -> Option<String> {
		None
	}

	fn include_directories(&self, name: &str, header_dirs: &BTreeSet<String>) -> Vec<String> {
		let mut patterns = Vec::new();
		for dir in header_dirs {
			patterns.push(join_relative(dir, "*.h"));
			// Some sources include .c files from include paths.
			patterns.push(join_relative(dir, "*.c"));
		}
		let mut lines = vec![
			"# header library".to_owned(),
			"cc_library(".to_owned(),
			format!("  name = \"{}\",", name),
			"  hdrs = glob([".to_owned(),
		];
		glob_lines(&mut lines, &patterns);
		lines.push(VISIBILITY.to_owned());
		lines.push(")".to_owned());
		lines
	}

	fn library(&self, rule: &LibraryRule) -> Result<Vec<String>, String> {
		library_lines(rule, None)
	}

	fn python_binary(&self, binary: &PythonBinary) -> Vec<String> {
		let mut imports = Vec::new();
		for src in &binary.srcs {
			let dir = display_dir(dirname(src)).to_owned();
			if !imports.contains(&dir) {
				imports.push(dir);
			}
		}
		let mut lines = vec![
			"py_binary(".to_owned(),
			format!("  name = \"{}\",", binary.name),
			format!("  main = \"{}\",", binary.main),
		];
		push_list(&mut lines, "srcs = [", &binary.srcs);
		// Lets scripts import their siblings.
		push_list(&mut lines, "imports = [", &imports);
		lines.push(")".to_owned());
		lines
	}

	fn genrule(&self, rule: &GenRule) -> Vec<String> {
		let mut lines = vec!["genrule(".to_owned(), format!("  name = \"{}\",", rule.name)];
		push_list(&mut lines, "srcs = [", &rule.srcs);
		push_list(&mut lines, "outs = [", &rule.outs);
		push_list(&mut lines, "tools = [", &rule.tools);
		lines.push(format!("  cmd = \"{}\",", escape_cmd(&rule.cmd)));
		lines.push(")".to_owned());
		lines
	}

	fn package_library(&self, _name: &str, _library: &str) -> Vec<String> {
		Vec::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		classify::partition_sources,
		dependency::ResolvedDependencies,
		input::BuildInput,
		static_library::LinkClosure,
	};

	fn rule(name: &str, kind: LibraryKind, sources: &[&str]) -> LibraryRule {
		let inputs = sources.iter().map(|x| BuildInput::Str(x.to_string())).collect::<Vec<_>>();
		LibraryRule {
			name: name.to_owned(),
			kind,
			relative_dir: "src/util".to_owned(),
			sources: partition_sources(&inputs, "src/util", false),
			c_std: None,
			cpp_std: None,
			c_flags: vec!["-Wno-error".to_owned(), "-DVERSION=\"1.0\"".to_owned()],
			cpp_flags: vec!["-Wno-error".to_owned(), "-std=c++17".to_owned()],
			include_dirs: vec!["include".to_owned()],
			include_rules: ["include".to_owned()].into_iter().collect(),
			links: LinkClosure { static_libs: vec!["mesa_util_c11".to_owned()], whole_static_libs: Vec::new() },
			deps: ResolvedDependencies::default(),
			local_header_dirs: vec!["src/util".to_owned(), "src/util/sha1".to_owned()],
		}
	}

	#[test]
	fn test_static_library() {
		let lines = Bazel.library(&rule("mesa_util", LibraryKind::Static, &["u_math.c"])).unwrap();
		assert_eq!(
			lines,
			vec![
				"cc_library(",
				"  name = \"mesa_util\",",
				"  srcs = [",
				"    \"src/util/u_math.c\",",
				"  ],",
				"  hdrs = glob([",
				"    \"src/util/*.h\",",
				"    \"src/util/sha1/*.h\",",
				"  ]),",
				"  copts = [",
				"    \"-I src/util\",",
				"    \"-I $(GENDIR)/src/util\",",
				"    \"-I include\",",
				"    \"-I $(GENDIR)/include\",",
				"    '-Wno-error',",
				"    '-DVERSION=\\\\\"1.0\\\\\"',",
				"  ],",
				"  deps = [",
				"    \"include\",",
				"    \"mesa_util_c11\",",
				"  ],",
				"  visibility = [ \"//visibility:public\" ],",
				")",
			]
		);
	}

	#[test]
	fn test_shared_library() {
		let mut shared = rule("vulkan_lvp", LibraryKind::Shared, &["lvp.cpp"]);
		shared.deps.shared_libs.insert("libdrm".to_owned());
		shared.deps.generated_header_files.insert("vk_enum.h".to_owned());
		shared.deps.generated_headers.insert("vk_enum".to_owned());
		let text = Bazel.library(&shared).unwrap().join("\n");
		assert!(text.starts_with("cc_library(\n  name = \"_vulkan_lvp\","));
		assert!(text.contains("  hdrs = [\n    \"vk_enum.h\",\n  ] + glob([\n"));
		assert!(text.contains("    '-std=c++17',\n"));
		assert!(!text.contains("VERSION"));
		assert!(text.contains("    \"vk_enum\",\n"));
		assert!(text.ends_with(
			"cc_shared_library(\n  name = \"vulkan_lvp\",\n  deps = [\n    \"_vulkan_lvp\",\n  ],\n  dynamic_deps = [\n    \"libdrm\",\n  ],\n)"
		));
		assert!(!text.contains("target_compatible_with"));
	}

	#[test]
	fn test_header_library_rejected() {
		let mut lib = rule("mesa_util", LibraryKind::Static, &["u_math.c"]);
		lib.deps.header_libs.insert("hwvulkan_headers".to_owned());
		assert!(Bazel.library(&lib).is_err());
	}

	#[test]
	fn test_static_library_drops_shared_links() {
		let mut lib = rule("mesa_util", LibraryKind::Static, &["u_math.c"]);
		lib.deps.shared_libs.insert("libdrm".to_owned());
		let text = Bazel.library(&lib).unwrap().join("\n");
		assert!(!text.contains("libdrm"));
		assert!(!text.contains("cc_shared_library"));
	}

	#[test]
	fn test_include_directories() {
		let dirs: BTreeSet<String> = ["include".to_owned(), "include/GL".to_owned()].into_iter().collect();
		let lines = Bazel.include_directories("include", &dirs);
		assert_eq!(lines[0], "# header library");
		assert_eq!(lines[2], "  name = \"include\",");
		assert_eq!(
			&lines[3..9],
			&[
				"  hdrs = glob([",
				"    \"include/*.h\",",
				"    \"include/*.c\",",
				"    \"include/GL/*.h\",",
				"    \"include/GL/*.c\",",
				"  ]),",
			]
		);
	}

	#[test]
	fn test_python_binary() {
		let binary = PythonBinary {
			name: "gen_tool.py".to_owned(),
			main: "tool.py".to_owned(),
			srcs: vec!["tool.py".to_owned(), "src/util/helper.py".to_owned()],
			libs: vec!["mako".to_owned()],
		};
		let text = Bazel.python_binary(&binary).join("\n");
		assert!(text.contains("  imports = [\n    \".\",\n    \"src/util\",\n  ],"));
		assert!(!text.contains("mako"));
	}
}
