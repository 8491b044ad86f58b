use std::sync::Arc;

use crate::{
	command::CommandArg,
	custom_target::CustomTarget,
	dependency::{Dependency, GeneratedSource},
	include_directories::IncludeDirectories,
	input::BuildInput,
	program::Program,
	static_library::StaticLibrary,
};

#[derive(Debug, Default)]
pub struct ProjectArgs {
	pub name: String,
	pub version: String,
	pub default_options: Vec<String>,
}

#[derive(Debug)]
pub struct ProjectArgumentsArgs {
	pub args: Vec<String>,
	pub languages: Vec<String>,
}

impl Default for ProjectArgumentsArgs {
	fn default() -> Self {
		ProjectArgumentsArgs { args: Vec::new(), languages: vec!["c".to_owned()] }
	}
}

#[derive(Debug, Default)]
pub struct IncludeDirectoriesArgs {
	pub dirs: Vec<String>,
	pub is_system: bool,
}

#[derive(Debug)]
pub struct DependencyArgs {
	pub name: String,
	pub required: bool,
}

impl Default for DependencyArgs {
	fn default() -> Self {
		DependencyArgs { name: String::new(), required: true }
	}
}

#[derive(Debug, Default)]
pub struct DeclareDependencyArgs {
	pub sources: Vec<GeneratedSource>,
	pub include_directories: Vec<Arc<IncludeDirectories>>,
	pub link_with: Vec<Arc<StaticLibrary>>,
	pub link_whole: Vec<Arc<StaticLibrary>>,
	pub compile_args: Vec<String>,
	pub dependencies: Vec<Arc<Dependency>>,
}

/// Arguments shared by `static_library`, `library` and `shared_library`.
#[derive(Debug, Default)]
pub struct LibraryArgs {
	pub name: String,
	pub sources: Vec<BuildInput>,
	pub c_args: Vec<String>,
	pub cpp_args: Vec<String>,
	pub dependencies: Vec<Arc<Dependency>>,
	pub include_directories: Vec<Arc<IncludeDirectories>>,
	pub link_with: Vec<Arc<StaticLibrary>>,
	pub link_whole: Vec<Arc<StaticLibrary>>,
}

#[derive(Debug)]
pub struct CustomTargetArgs {
	pub name: String,
	pub program: Program,
	pub command: Vec<CommandArg>,
	pub input: Vec<BuildInput>,
	pub output: Vec<String>,
	pub depends: Vec<Arc<CustomTarget>>,
	pub depend_files: Vec<BuildInput>,
	pub capture: bool,
}

impl Default for CustomTargetArgs {
	fn default() -> Self {
		CustomTargetArgs {
			name: String::new(),
			program: Program::Tool(String::new()),
			command: Vec::new(),
			input: Vec::new(),
			output: Vec::new(),
			depends: Vec::new(),
			depend_files: Vec::new(),
			capture: false,
		}
	}
}
