use core::{cmp, hash};
use std::{
	collections::{BTreeSet, HashSet},
	sync::Arc,
};

use crate::{
	config::{DependencyTargetType, ExtDependencyTarget},
	custom_target::{CustomTarget, CustomTargetItem},
	include_directories::IncludeDirectories,
	static_library::{link_closure, StaticLibrary},
};

/// Generated files a dependency carries to its consumers.
#[derive(Clone, Debug)]
pub enum GeneratedSource {
	Target(Arc<CustomTarget>),
	Item(CustomTargetItem),
}

impl GeneratedSource {
	fn target(&self) -> &CustomTarget {
		match self {
			GeneratedSource::Target(x) => x,
			GeneratedSource::Item(x) => &x.target,
		}
	}
}

#[derive(Debug, Default)]
pub struct Dependency {
	pub name: String,
	pub found: bool,
	pub sources: Vec<GeneratedSource>,
	pub include_directories: Vec<Arc<IncludeDirectories>>,
	pub compile_args: Vec<String>,
	pub link_with: Vec<Arc<StaticLibrary>>,
	pub link_whole: Vec<Arc<StaticLibrary>>,
	pub dependencies: Vec<Arc<Dependency>>,
	/// Prebuilt libraries from the external-dependency table.
	pub targets: Vec<ExtDependencyTarget>,
}

impl Dependency {
	pub fn external(name: &str, targets: Vec<ExtDependencyTarget>) -> Dependency {
		Dependency { name: name.to_owned(), found: true, targets, ..Default::default() }
	}

	pub fn not_found(name: &str) -> Dependency {
		Dependency { name: name.to_owned(), found: false, ..Default::default() }
	}
}

#[derive(Clone)]
struct DepPtr(Arc<Dependency>);

impl cmp::PartialEq for DepPtr {
	fn eq(&self, other: &DepPtr) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}
impl cmp::Eq for DepPtr {}
impl hash::Hash for DepPtr {
	fn hash<H>(&self, hasher: &mut H)
	where
		H: std::hash::Hasher,
	{
		(Arc::as_ptr(&self.0) as *const ()).hash(hasher)
	}
}

/// Everything a consumer takes from a set of dependencies, flattened over nested dependencies.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
	/// Rule names of the header-producing generators.
	pub generated_headers: BTreeSet<String>,
	pub generated_header_files: BTreeSet<String>,
	/// Include directories in first-seen order.
	pub include_dirs: Vec<String>,
	/// Names of the include-directory rules, empty where the backend emits none.
	pub include_rules: BTreeSet<String>,
	pub static_libs: BTreeSet<String>,
	pub whole_static_libs: BTreeSet<String>,
	pub shared_libs: BTreeSet<String>,
	pub header_libs: BTreeSet<String>,
	pub compile_args: Vec<String>,
}

impl ResolvedDependencies {
	fn add(&mut self, dep: &Dependency) {
		log::debug!("  dep: {}", dep.name);
		for source in &dep.sources {
			let target = source.target();
			self.generated_headers.insert(target.header_rule_name());
			self.generated_header_files.extend(target.header_outputs());
		}
		for inc in &dep.include_directories {
			for dir in &inc.dirs {
				if !self.include_dirs.contains(dir) {
					self.include_dirs.push(dir.clone());
				}
			}
			if inc.is_rule() {
				self.include_rules.insert(inc.name.clone());
			}
		}
		let closure = link_closure(&dep.link_with, &dep.link_whole);
		self.static_libs.extend(closure.static_libs);
		self.whole_static_libs.extend(closure.whole_static_libs);
		for target in &dep.targets {
			let names = match target.target_type {
				DependencyTargetType::SharedLibrary => &mut self.shared_libs,
				DependencyTargetType::StaticLibrary => &mut self.static_libs,
				DependencyTargetType::HeaderLibrary => &mut self.header_libs,
			};
			names.insert(target.target_name.clone());
		}
		for arg in &dep.compile_args {
			self.compile_args.push(arg.clone());
		}
	}
}

/// Resolves `deps` and their nested dependencies. Each dependency is visited once, so resolving
/// the same list again yields the same result.
pub fn resolve(deps: &[Arc<Dependency>]) -> ResolvedDependencies {
	let mut resolved = ResolvedDependencies::default();
	let mut visited = HashSet::new();
	let mut stack: Vec<Arc<Dependency>> = deps.iter().rev().cloned().collect();
	while let Some(dep) = stack.pop() {
		if !visited.insert(DepPtr(dep.clone())) {
			continue;
		}
		resolved.add(&dep);
		stack.extend(dep.dependencies.iter().rev().cloned());
	}
	resolved
}

#[cfg(test)]
fn sample_dependencies() -> Vec<Arc<Dependency>> {
	let gen = Arc::new(CustomTarget::new("vk_enum", vec!["vk_enum.h".to_owned(), "vk_enum.c".to_owned()], true));
	let util = Arc::new(StaticLibrary { name: "util".to_owned(), link_with: Vec::new(), link_whole: Vec::new() });
	let zlib = Arc::new(Dependency::external(
		"zlib",
		vec![ExtDependencyTarget {
			target_name: "libz".to_owned(),
			target_type: DependencyTargetType::SharedLibrary,
		}],
	));
	let idep_util = Arc::new(Dependency {
		name: "idep_util".to_owned(),
		found: true,
		sources: vec![GeneratedSource::Target(gen)],
		include_directories: vec![Arc::new(IncludeDirectories {
			name: "src_util".to_owned(),
			dirs: vec!["src/util".to_owned()],
			is_system: false,
		})],
		compile_args: vec!["-DHAVE_UTIL".to_owned()],
		link_with: vec![util],
		dependencies: vec![zlib.clone()],
		..Default::default()
	});
	vec![idep_util, zlib]
}

#[test]
fn test_resolve() {
	let deps = sample_dependencies();
	let resolved = resolve(&deps);
	assert_eq!(resolved.generated_headers.iter().collect::<Vec<_>>(), vec!["vk_enum_h"]);
	assert_eq!(resolved.generated_header_files.iter().collect::<Vec<_>>(), vec!["vk_enum.h"]);
	assert_eq!(resolved.include_dirs, vec!["src/util".to_owned()]);
	assert_eq!(resolved.include_rules.iter().collect::<Vec<_>>(), vec!["src_util"]);
	assert_eq!(resolved.static_libs.iter().collect::<Vec<_>>(), vec!["util"]);
	assert_eq!(resolved.shared_libs.iter().collect::<Vec<_>>(), vec!["libz"]);
	// zlib is reachable twice but contributes once.
	assert_eq!(resolved.compile_args, vec!["-DHAVE_UTIL".to_owned()]);
}

#[test]
fn test_resolve_idempotent() {
	let deps = sample_dependencies();
	assert_eq!(resolve(&deps), resolve(&deps));
	assert_eq!(resolve(&[]), ResolvedDependencies::default());
}
