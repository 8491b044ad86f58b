use std::{
	collections::BTreeSet, //
	sync::Arc,
};

use super::{
	escape_cmd, location, push_list, Emitter, GenRule, Invocation, LibraryKind, LibraryRule, PythonBinary,
};
use crate::{
	custom_target::{CustomTarget, CustomTargetItem},
	misc::display_dir,
	program::Program,
};

/// Tools that need `m4` alongside them in the sandbox.
const M4_TOOLS: [&str; 2] = ["bison", "flex"];

fn escape_flag(flag: &str) -> String {
	flag.replace('"', "\\\"")
}

/// Android blueprint (`Android.bp`).
pub(super) struct Soong;

impl Emitter for Soong {
	fn gen_dir_marker(&self) -> &'static str {
		"$(genDir)"
	}

	fn splits_headers(&self) -> bool {
		true
	}

	fn expands_project_build_root(&self) -> bool {
		false
	}

	fn globs_local_headers(&self) -> bool {
		false
	}

	fn target_references(&self, target: &CustomTarget) -> Vec<String> {
		target.rule_names().into_iter().map(|x| format!(":{}", x)).collect()
	}

	fn item_reference(&self, item: &CustomTargetItem) -> String {
		format!(":{}", item.target.rule_for_output(item.index))
	}

	fn program_invocation(&self, program: &Program) -> Invocation {
		match program {
			Program::Tool(tool) if M4_TOOLS.contains(&tool.as_str()) => Invocation {
				command: format!("M4={} {}", location("m4"), location(tool)),
				tools: vec!["m4".to_owned(), tool.clone()],
			},
			Program::Tool(tool) => Invocation { command: tool.clone(), tools: Vec::new() },
			Program::Script(script) => Invocation { command: location(script), tools: Vec::new() },
		}
	}

	fn script_environment(&self, script: &str, depends: &[Arc<CustomTarget>]) -> Option<String> {
		// Scripts import their siblings and the scripts generated by their dependencies.
		let mut dirs = vec![format!("`dirname {}`", location(script))];
		for dep in depends {
			dirs.push(format!("`dirname {}`", location(&format!(":{}", dep.header_rule_name()))));
		}
		Some(format!("PYTHONPATH={}", dirs.join(":")))
	}

	fn include_directories(&self, _name: &str, _header_dirs: &BTreeSet<String>) -> Vec<String> {
		Vec::new()
	}

	fn library(&self, rule: &LibraryRule) -> Result<Vec<String>, String> {
		let module_type = match rule.kind {
			LibraryKind::Static => "cc_library_static",
			LibraryKind::Shared => "cc_library_shared",
		};
		let mut local_include_dirs = vec![display_dir(&rule.relative_dir).to_owned()];
		for dir in &rule.include_dirs {
			let dir = display_dir(dir).to_owned();
			if !local_include_dirs.contains(&dir) {
				local_include_dirs.push(dir);
			}
		}

		let mut lines = vec![format!("{} {{", module_type), format!("  name: \"{}\",", rule.name)];
		push_list(&mut lines, "srcs: [", rule.sources.non_header_sources());
		push_list(&mut lines, "generated_headers: [", rule.generated_headers());
		push_list(&mut lines, "generated_sources: [", &rule.sources.generated_sources);
		if let Some(c_std) = &rule.c_std {
			lines.push(format!("  c_std: \"{}\",", c_std));
		}
		if let Some(cpp_std) = &rule.cpp_std {
			lines.push(format!("  cpp_std: \"{}\",", cpp_std));
		}
		push_list(&mut lines, "conlyflags: [", rule.c_flags.iter().map(|x| escape_flag(x)));
		push_list(&mut lines, "cppflags: [", rule.cpp_flags.iter().map(|x| escape_flag(x)));
		push_list(&mut lines, "local_include_dirs: [", &local_include_dirs);
		push_list(&mut lines, "static_libs: [", rule.static_libs());
		push_list(&mut lines, "whole_static_libs: [", rule.whole_static_libs());
		push_list(&mut lines, "shared_libs: [", &rule.deps.shared_libs);
		push_list(&mut lines, "header_libs: [", &rule.deps.header_libs);
		lines.push("  visibility: [\"//visibility:public\"],".to_owned());
		lines.push("}".to_owned());
		Ok(lines)
	}

	fn python_binary(&self, binary: &PythonBinary) -> Vec<String> {
		let mut lines = vec![
			"python_binary_host {".to_owned(),
			format!("  name: \"{}\",", binary.name),
			format!("  main: \"{}\",", binary.main),
		];
		push_list(&mut lines, "srcs: [", &binary.srcs);
		push_list(&mut lines, "libs: [", &binary.libs);
		// PYTHONPATH in the genrule only works with the plain interpreter.
		lines.extend(
			["  version: {", "    py3: {", "      embedded_launcher: false,", "    },", "  },", "}"]
				.map(String::from),
		);
		lines
	}

	fn genrule(&self, rule: &GenRule) -> Vec<String> {
		let mut lines = vec!["genrule {".to_owned(), format!("  name: \"{}\",", rule.name)];
		push_list(&mut lines, "srcs: [", &rule.srcs);
		push_list(&mut lines, "out: [", &rule.outs);
		push_list(&mut lines, "tools: [", &rule.tools);
		push_list(&mut lines, "export_include_dirs: [", &rule.export_include_dirs);
		lines.push(format!("  cmd: \"{}\",", escape_cmd(&rule.cmd)));
		lines.push("}".to_owned());
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

	fn simple_rule(name: &str, kind: LibraryKind) -> LibraryRule {
		LibraryRule {
			name: name.to_owned(),
			kind,
			relative_dir: String::new(),
			sources: partition_sources(&[BuildInput::Str(format!("{}.c", name))], "", true),
			c_std: None,
			cpp_std: None,
			c_flags: vec!["-Wno-error".to_owned()],
			cpp_flags: vec!["-Wno-error".to_owned()],
			include_dirs: Vec::new(),
			include_rules: BTreeSet::new(),
			links: LinkClosure::default(),
			deps: ResolvedDependencies::default(),
			local_header_dirs: Vec::new(),
		}
	}

	#[test]
	fn test_simple_static_library() {
		let lines = Soong.library(&simple_rule("foo", LibraryKind::Static)).unwrap();
		assert_eq!(
			lines,
			vec![
				"cc_library_static {",
				"  name: \"foo\",",
				"  srcs: [",
				"    \"foo.c\",",
				"  ],",
				"  conlyflags: [",
				"    \"-Wno-error\",",
				"  ],",
				"  cppflags: [",
				"    \"-Wno-error\",",
				"  ],",
				"  local_include_dirs: [",
				"    \".\",",
				"  ],",
				"  visibility: [\"//visibility:public\"],",
				"}",
			]
		);
	}

	#[test]
	fn test_library_links_and_flags() {
		let mut rule = simple_rule("vulkan", LibraryKind::Shared);
		rule.relative_dir = "src/vulkan".to_owned();
		rule.include_dirs = vec!["include".to_owned(), "src/vulkan".to_owned()];
		rule.c_std = Some("c11".to_owned());
		rule.c_flags.push("-DNAME=\"mesa\"".to_owned());
		rule.links = LinkClosure {
			static_libs: vec!["util".to_owned(), "compiler".to_owned()],
			whole_static_libs: vec!["compiler".to_owned()],
		};
		rule.deps.shared_libs.insert("libz".to_owned());
		rule.deps.header_libs.insert("hwvulkan_headers".to_owned());

		let text = Soong.library(&rule).unwrap().join("\n");
		assert!(text.starts_with("cc_library_shared {"));
		assert!(text.contains("  c_std: \"c11\",\n"));
		assert!(text.contains("    \"-DNAME=\\\"mesa\\\"\",\n"));
		assert!(text.contains("  local_include_dirs: [\n    \"src/vulkan\",\n    \"include\",\n  ],"));
		assert!(text.contains("  static_libs: [\n    \"util\",\n  ],"));
		assert!(text.contains("  whole_static_libs: [\n    \"compiler\",\n  ],"));
		assert!(text.contains("  shared_libs: [\n    \"libz\",\n  ],"));
		assert!(text.contains("  header_libs: [\n    \"hwvulkan_headers\",\n  ],"));
		assert!(!text.contains("cpp_std"));
	}

	#[test]
	fn test_program_invocation() {
		let bison = Soong.program_invocation(&Program::Tool("bison".to_owned()));
		assert_eq!(bison.command, "M4=$(location m4) $(location bison)");
		assert_eq!(bison.tools, vec!["m4", "bison"]);
		let script = Soong.program_invocation(&Program::Script("src/gen.py".to_owned()));
		assert_eq!(script.command, "$(location src/gen.py)");
		assert!(script.tools.is_empty());
	}

	#[test]
	fn test_script_environment() {
		let dep = Arc::new(CustomTarget::new("gen_py", vec!["helper.py".to_owned()], true));
		assert_eq!(
			Soong.script_environment("src/gen.py", &[dep]),
			Some("PYTHONPATH=`dirname $(location src/gen.py)`:`dirname $(location :gen_py)`".to_owned())
		);
	}
}
