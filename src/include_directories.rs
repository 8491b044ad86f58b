use std::{
	collections::BTreeSet, //
	fs,
	path::Path,
};

use crate::misc::join_relative;

/// A set of include directories. On Bazel-style backends it is also a header-library rule
/// named `name`; on Soong the name is empty and only `dirs` is used.
#[derive(Debug)]
pub struct IncludeDirectories {
	pub name: String,
	pub dirs: Vec<String>,
	pub is_system: bool,
}

impl IncludeDirectories {
	pub fn is_rule(&self) -> bool {
		!self.name.is_empty()
	}
}

/// Rule name of an include-directory set: the first directory with `/` replaced by `_`.
pub(crate) fn rule_name(dirs: &[String], is_system: bool) -> String {
	let mut name = match dirs.first() {
		Some(dir) if !dir.is_empty() => dir.replace('/', "_"),
		_ => "root".to_owned(),
	};
	if is_system {
		name += "_sys";
	}
	name
}

fn add_subdirs(source_root: &Path, dir: &str, dir_set: &mut BTreeSet<String>) {
	let entries = match fs::read_dir(source_root.join(dir)) {
		Ok(x) => x,
		Err(e) => {
			log::debug!("Not listing include dir \"{}\": {}", dir, e);
			return;
		}
	};
	for entry in entries.flatten() {
		if entry.path().is_dir() {
			dir_set.insert(join_relative(dir, &entry.file_name().to_string_lossy()));
		}
	}
}

/// Directories whose headers a header-library rule must expose. Sources include files one level
/// below an include path, so every immediate subdirectory is added, and `deep_dirs` go two levels.
pub(crate) fn header_dir_set(source_root: &Path, dirs: &[String], deep_dirs: &[String]) -> BTreeSet<String> {
	let mut dir_set = BTreeSet::new();
	for dir in dirs {
		dir_set.insert(dir.clone());
		add_subdirs(source_root, dir, &mut dir_set);
	}
	for dir in dir_set.clone() {
		if deep_dirs.contains(&dir) {
			for subdir in dir_set.clone().into_iter().filter(|x| x.starts_with(&(dir.clone() + "/"))) {
				add_subdirs(source_root, &subdir, &mut dir_set);
			}
		}
	}
	dir_set
}

#[test]
fn test_rule_name() {
	assert_eq!(rule_name(&["src/mesa".to_owned(), "include".to_owned()], false), "src_mesa");
	assert_eq!(rule_name(&["include".to_owned()], true), "include_sys");
	assert_eq!(rule_name(&["".to_owned()], false), "root");
}

#[test]
fn test_header_dir_set_without_filesystem() {
	let dirs = vec!["does/not/exist".to_owned(), "neither/does/this".to_owned()];
	let set = header_dir_set(Path::new("/nonexistent-root"), &dirs, &[]);
	assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["does/not/exist".to_owned(), "neither/does/this".to_owned()]);
}
