const HEADER_EXTENSIONS: [&str; 4] = [".h", ".hh", ".hpp", ".hxx"];
const SOURCE_EXTENSIONS: [&str; 4] = [".c", ".cc", ".cpp", ".cxx"];

pub(crate) fn is_header(filename: &str) -> bool {
	HEADER_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}

pub(crate) fn is_source(filename: &str) -> bool {
	SOURCE_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}

pub(crate) fn is_c_source(filename: &str) -> bool {
	filename.ends_with(".c")
}

pub(crate) fn is_python_script(filename: &str) -> bool {
	filename.ends_with(".py")
}

/// Lexically normalizes a relative path: collapses `.`, `..` and repeated separators.
/// The project root normalizes to the empty string.
pub(crate) fn normalize(path: &str) -> String {
	let absolute = path.starts_with('/');
	let mut parts: Vec<&str> = Vec::new();
	for component in path.split('/') {
		match component {
			"" | "." => {}
			".." => match parts.last() {
				Some(&last) if last != ".." => {
					parts.pop();
				}
				_ if absolute => {}
				_ => parts.push(".."),
			},
			other => parts.push(other),
		}
	}
	let joined = parts.join("/");
	if absolute {
		String::from("/") + &joined
	} else {
		joined
	}
}

/// Resolves `path` against the directory `dir`, both relative to the project root.
pub(crate) fn join_relative(dir: &str, path: &str) -> String {
	if path.starts_with('/') || dir.is_empty() {
		normalize(path)
	} else {
		normalize(&format!("{}/{}", dir, path))
	}
}

/// Spelling of a root-relative directory inside emitted rules, where the root is `.`.
pub(crate) fn display_dir(dir: &str) -> &str {
	if dir.is_empty() {
		"."
	} else {
		dir
	}
}

pub(crate) fn basename(path: &str) -> &str {
	match path.rfind('/') {
		Some(idx) => &path[idx + 1..],
		None => path,
	}
}

pub(crate) fn dirname(path: &str) -> &str {
	match path.rfind('/') {
		Some(idx) => &path[..idx],
		None => "",
	}
}

#[test]
fn test_extensions() {
	assert!(is_header("gen.h"));
	assert!(is_header("a/b/gen.hpp"));
	assert!(!is_header("gen.c"));
	assert!(!is_header("header.txt"));
	assert!(is_source("gen.c"));
	assert!(is_source("gen.cpp"));
	assert!(is_source("gen.cc"));
	assert!(!is_source("gen.h"));
	assert!(!is_source("gen.h.dummy.cfg"));
	assert!(is_source("gen.h.dummy.c"));
	assert!(is_header("gen.c.dummy.h"));
}

#[test]
fn test_normalize() {
	assert_eq!(normalize("./src//mesa/"), "src/mesa");
	assert_eq!(normalize("src/mesa/../util"), "src/util");
	assert_eq!(normalize("."), "");
	assert_eq!(normalize("../include"), "../include");
	assert_eq!(join_relative("src/compiler", "nir"), "src/compiler/nir");
	assert_eq!(join_relative("src/compiler", "../util"), "src/util");
	assert_eq!(join_relative("", "include"), "include");
	assert_eq!(join_relative("src", "/abs/path"), "/abs/path");
}

#[test]
fn test_basename_dirname() {
	assert_eq!(basename("src/util/gen.py"), "gen.py");
	assert_eq!(basename("gen.py"), "gen.py");
	assert_eq!(dirname("src/util/gen.py"), "src/util");
	assert_eq!(dirname("gen.py"), "");
	assert_eq!(display_dir(""), ".");
	assert_eq!(display_dir("src"), "src");
}
