mod bazel;
mod fuchsia;
mod soong;

use std::{
	collections::BTreeSet, //
	sync::Arc,
};

use crate::{
	classify::SourcePartition,
	custom_target::{CustomTarget, CustomTargetItem},
	dependency::ResolvedDependencies,
	program::Program,
	static_library::LinkClosure,
};

/// Build-file dialect a run writes. Fuchsia shares Bazel's rule syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
	Soong,
	Bazel,
	Fuchsia,
}

impl Backend {
	pub fn select(build: &str, host_machine: &str) -> Result<Backend, String> {
		match build.to_lowercase().as_str() {
			"soong" => Ok(Backend::Soong),
			"bazel" if host_machine.eq_ignore_ascii_case("fuchsia") => Ok(Backend::Fuchsia),
			"bazel" => Ok(Backend::Bazel),
			_ => Err(format!("Unknown build system: \"{}\"", build)),
		}
	}

	pub fn output_filename(&self) -> &'static str {
		match self {
			Backend::Soong => "Android.bp",
			Backend::Bazel | Backend::Fuchsia => "BUILD.bazel",
		}
	}

	pub fn emitter(&self) -> Box<dyn Emitter> {
		match self {
			Backend::Soong => Box::new(soong::Soong),
			Backend::Bazel => Box::new(bazel::Bazel),
			Backend::Fuchsia => Box::new(fuchsia::Fuchsia),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryKind {
	Static,
	Shared,
}

/// A library with its inputs classified and its dependencies resolved.
#[derive(Debug)]
pub struct LibraryRule {
	pub name: String,
	pub kind: LibraryKind,
	pub relative_dir: String,
	pub sources: SourcePartition,
	pub c_std: Option<String>,
	pub cpp_std: Option<String>,
	pub c_flags: Vec<String>,
	pub cpp_flags: Vec<String>,
	/// Call-site include directories followed by those of dependencies.
	pub include_dirs: Vec<String>,
	pub include_rules: BTreeSet<String>,
	pub links: LinkClosure,
	pub deps: ResolvedDependencies,
	/// Directories whose headers the library may include without declaring them.
	pub local_header_dirs: Vec<String>,
}

impl LibraryRule {
	pub fn whole_static_libs(&self) -> BTreeSet<String> {
		let mut libs: BTreeSet<String> = self.links.whole_static_libs.iter().cloned().collect();
		libs.extend(self.deps.whole_static_libs.iter().cloned());
		libs
	}

	/// Static libraries not already linked whole.
	pub fn static_libs(&self) -> BTreeSet<String> {
		let whole = self.whole_static_libs();
		self.links
			.static_libs
			.iter()
			.chain(&self.deps.static_libs)
			.filter(|x| !whole.contains(*x))
			.cloned()
			.collect()
	}

	pub fn generated_headers(&self) -> BTreeSet<String> {
		self.sources.generated_headers.union(&self.deps.generated_headers).cloned().collect()
	}
}

#[derive(Debug)]
pub struct PythonBinary {
	pub name: String,
	pub main: String,
	pub srcs: Vec<String>,
	pub libs: Vec<String>,
}

#[derive(Debug)]
pub struct GenRule {
	pub name: String,
	pub srcs: Vec<String>,
	pub outs: Vec<String>,
	pub tools: Vec<String>,
	/// Empty where the rule exports nothing.
	pub export_include_dirs: Vec<String>,
	pub cmd: String,
}

/// How a backend starts a program inside a generation rule.
#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
	pub command: String,
	pub tools: Vec<String>,
}

pub trait Emitter {
	/// Token standing for the generated-files root when the rule runs.
	fn gen_dir_marker(&self) -> &'static str;
	/// Whether generated headers and sources must come from separate rules.
	fn splits_headers(&self) -> bool;
	fn expands_project_build_root(&self) -> bool;
	fn globs_local_headers(&self) -> bool;

	/// Labels a rule uses to consume every output of `target`.
	fn target_references(&self, target: &CustomTarget) -> Vec<String>;
	fn item_reference(&self, item: &CustomTargetItem) -> String;
	fn program_invocation(&self, program: &Program) -> Invocation;
	/// Environment prefix for commands running `script`, if the backend needs one.
	fn script_environment(&self, script: &str, depends: &[Arc<CustomTarget>]) -> Option<String>;

	fn include_directories(&self, name: &str, header_dirs: &BTreeSet<String>) -> Vec<String>;
	fn library(&self, rule: &LibraryRule) -> Result<Vec<String>, String>;
	fn python_binary(&self, binary: &PythonBinary) -> Vec<String>;
	fn genrule(&self, rule: &GenRule) -> Vec<String>;
	/// Rule standing in for a pkg-config file. Empty where the backend has none.
	fn package_library(&self, name: &str, library: &str) -> Vec<String>;
}

pub(crate) fn location(path: &str) -> String {
	format!("$(location {})", path)
}

fn quoted(item: &str) -> String {
	format!("\"{}\"", item)
}

/// Appends `header`, one quoted item per line and a closing bracket. Nothing is written for an
/// empty list.
fn push_list<I, S>(lines: &mut Vec<String>, header: &str, items: I)
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let items = items.into_iter().map(|x| format!("    {},", quoted(x.as_ref()))).collect::<Vec<_>>();
	if items.is_empty() {
		return;
	}
	lines.push(format!("  {}", header));
	lines.extend(items);
	lines.push("  ],".to_owned());
}

/// Escapes the command for a double-quoted attribute value.
fn escape_cmd(cmd: &str) -> String {
	cmd.replace('"', "\\\"")
}

#[test]
fn test_select_backend() {
	assert_eq!(Backend::select("soong", "android"), Ok(Backend::Soong));
	assert_eq!(Backend::select("Soong", "linux"), Ok(Backend::Soong));
	assert_eq!(Backend::select("bazel", "fuchsia"), Ok(Backend::Fuchsia));
	assert_eq!(Backend::select("bazel", "linux"), Ok(Backend::Bazel));
	assert!(Backend::select("make", "linux").is_err());
	assert_eq!(Backend::Soong.output_filename(), "Android.bp");
	assert_eq!(Backend::Fuchsia.output_filename(), "BUILD.bazel");
}

#[test]
fn test_push_list() {
	let mut lines = Vec::new();
	push_list(&mut lines, "srcs: [", Vec::<String>::new());
	assert!(lines.is_empty());
	push_list(&mut lines, "srcs: [", ["a.c", "b.c"]);
	assert_eq!(lines, vec!["  srcs: [", "    \"a.c\",", "    \"b.c\",", "  ],"]);
}
