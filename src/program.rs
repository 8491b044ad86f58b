use crate::misc::{is_python_script, join_relative};

/// Executable a custom target runs: a tool found on the host or a script in the source tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Program {
	Tool(String),
	/// Path relative to the project root.
	Script(String),
}

impl Program {
	pub fn find(name: &str, relative_dir: &str) -> Program {
		if is_python_script(name) {
			Program::Script(join_relative(relative_dir, name))
		} else {
			Program::Tool(name.to_owned())
		}
	}

	pub fn command(&self) -> &str {
		match self {
			Program::Tool(x) => x,
			Program::Script(x) => x,
		}
	}

	pub fn script(&self) -> Option<&str> {
		match self {
			Program::Script(x) => Some(x),
			Program::Tool(_) => None,
		}
	}

	/// Every program resolves; the emitted rule fails at build time if the tool is missing.
	pub fn found(&self) -> bool {
		true
	}
}

#[test]
fn test_find_program() {
	assert_eq!(Program::find("bison", "src/compiler"), Program::Tool("bison".to_owned()));
	let script = Program::find("gen_tables.py", "src/compiler");
	assert_eq!(script.script(), Some("src/compiler/gen_tables.py"));
	assert_eq!(script.command(), "src/compiler/gen_tables.py");
	assert!(script.found());
}
