use std::{
	collections::BTreeMap, //
	fs,
	io::Write,
	path::{Path, PathBuf},
	sync::Arc,
};

use crate::{
	capability::{AllSupported, Compiler, FilteredOracle},
	classify::{partition_sources, Obfuscation},
	command::{command_line, find_script, relative_inputs, replace_script, synthesize, CommandTemplate},
	config::{OptionValue, ProjectConfig},
	custom_target::CustomTarget,
	declare::{
		CustomTargetArgs, DeclareDependencyArgs, DependencyArgs, IncludeDirectoriesArgs, LibraryArgs,
		ProjectArgs, ProjectArgumentsArgs,
	},
	dependency::{resolve, Dependency},
	generator::{location, Backend, Emitter, GenRule, LibraryKind, LibraryRule, PythonBinary},
	include_directories::{header_dir_set, rule_name, IncludeDirectories},
	input::File,
	misc::{basename, dirname, display_dir, is_python_script, join_relative, normalize},
	program::Program,
	project::ProjectInfo,
	static_library::{link_closure, SharedLibrary, StaticLibrary},
};

/// Directories holding one of these are separate areas with their own rules.
const AREA_MARKER: &str = "meson.build";
const PLACEHOLDER_CONTENT: &str = "//nothing to see here";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleKind {
	Python,
	PkgConfig,
}

fn push_unique(items: &mut Vec<String>, item: String) {
	if !items.contains(&item) {
		items.push(item);
	}
}

/// Subdirectories of `dir` (besides `dir` itself) whose headers belong to the rules declared in
/// `dir`. Only one level is searched.
fn local_header_dirs(source_root: &Path, dir: &str) -> Vec<String> {
	let mut dirs = vec![dir.to_owned()];
	if dir.is_empty() {
		return dirs;
	}
	let entries = match fs::read_dir(source_root.join(dir)) {
		Ok(x) => x,
		Err(e) => {
			log::debug!("Not listing \"{}\": {}", dir, e);
			return dirs;
		}
	};
	let mut subdirs = entries
		.flatten()
		.filter(|x| x.path().is_dir() && !x.path().join(AREA_MARKER).exists())
		.map(|x| join_relative(dir, &x.file_name().to_string_lossy()))
		.collect::<Vec<_>>();
	subdirs.sort();
	dirs.extend(subdirs);
	dirs
}

/// `.py` files next to `script` in the source tree, sorted.
fn sibling_scripts(source_root: &Path, script: &str) -> Vec<String> {
	let dir = dirname(script);
	let entries = match fs::read_dir(source_root.join(dir)) {
		Ok(x) => x,
		Err(e) => {
			log::debug!("Not listing scripts next to \"{}\": {}", script, e);
			return Vec::new();
		}
	};
	let mut scripts = entries
		.flatten()
		.map(|x| x.file_name().to_string_lossy().into_owned())
		.filter(|x| is_python_script(x))
		.map(|x| join_relative(dir, &x))
		.collect::<Vec<_>>();
	scripts.sort();
	scripts
}

/// State of one translation run. Every build-description call goes through one of the verb
/// methods, which emit the resulting rules immediately.
pub struct RunContext {
	config: ProjectConfig,
	backend: Backend,
	emitter: Box<dyn Emitter>,
	source_root: PathBuf,
	relative_dir: String,
	project: ProjectInfo,
	include_dirs: BTreeMap<String, Arc<IncludeDirectories>>,
	oracle: Arc<FilteredOracle<AllSupported>>,
	out: Box<dyn Write>,
}

impl RunContext {
	pub fn new(config: ProjectConfig, backend: Backend, source_root: PathBuf, out: Box<dyn Write>) -> RunContext {
		let oracle = Arc::new(FilteredOracle::new(&config, AllSupported));
		RunContext {
			config,
			backend,
			emitter: backend.emitter(),
			source_root,
			relative_dir: String::new(),
			project: ProjectInfo::default(),
			include_dirs: BTreeMap::new(),
			oracle,
			out,
		}
	}

	pub fn config(&self) -> &ProjectConfig {
		&self.config
	}

	pub fn backend(&self) -> Backend {
		self.backend
	}

	pub fn relative_dir(&self) -> &str {
		&self.relative_dir
	}

	pub fn get_compiler(&self, language: &str) -> Result<Compiler, String> {
		match language {
			"c" | "cpp" => Ok(Compiler { language: language.to_owned(), oracle: self.oracle.clone() }),
			_ => Err(format!("Unsupported compiler language: \"{}\"", language)),
		}
	}

	fn emit(&mut self, lines: &[String]) -> Result<(), String> {
		let mut write = || -> std::io::Result<()> {
			for line in lines {
				writeln!(self.out, "{}", line)?;
			}
			writeln!(self.out)?;
			self.out.flush()
		};
		write().map_err(|e| format!("Error writing {}: {}", self.backend.output_filename(), e))
	}

	pub fn finish(mut self) -> Result<(), String> {
		self.out
			.flush()
			.map_err(|e| format!("Error writing {}: {}", self.backend.output_filename(), e))
	}

	pub fn project(&mut self, args: ProjectArgs) {
		log::info!("project: {} {}", args.name, args.version);
		self.project = ProjectInfo::new(&args.name, &args.version, &args.default_options);
	}

	pub fn add_project_arguments(&mut self, args: ProjectArgumentsArgs) -> Result<(), String> {
		self.project.add_arguments(&args.args, &args.languages)
	}

	/// Moves to `path`, relative to the source root. Later paths resolve against it.
	pub fn subdir(&mut self, path: &str) {
		self.relative_dir = normalize(path);
		log::info!("subdir: {}", display_dir(&self.relative_dir));
	}

	pub fn files(&self, paths: &[String]) -> Vec<File> {
		paths.iter().map(|x| File { path: join_relative(&self.relative_dir, x) }).collect()
	}

	pub fn find_program(&self, name: &str) -> Program {
		Program::find(name, &self.relative_dir)
	}

	pub fn get_option(&self, name: &str) -> Option<OptionValue> {
		self.config.option(name).cloned()
	}

	pub fn import_module(&self, name: &str) -> Result<ModuleKind, String> {
		let host = self.config.host().to_lowercase();
		match name {
			"python" => Ok(ModuleKind::Python),
			"pkgconfig" if ["android", "fuchsia", "linux"].contains(&host.as_str()) => Ok(ModuleKind::PkgConfig),
			_ => Err(format!("Unhandled module: \"{}\" for host machine: \"{}\"", name, self.config.host())),
		}
	}

	/// `pkgconfig.generate()`. Backends without a package-library rule only log the request.
	pub fn pkgconfig_generate(&mut self, name: &str, library: Option<&StaticLibrary>) -> Result<(), String> {
		let lines = match library {
			Some(lib) => self.emitter.package_library(name, &lib.name),
			None => Vec::new(),
		};
		if lines.is_empty() {
			log::info!("pkgconfig.generate: {} (nothing emitted)", name);
			return Ok(());
		}
		log::info!("pkgconfig.generate: {}", name);
		self.emit(&lines)
	}

	pub fn include_directories(&mut self, args: IncludeDirectoriesArgs) -> Result<Arc<IncludeDirectories>, String> {
		let dirs = args.dirs.iter().map(|x| join_relative(&self.relative_dir, x)).collect::<Vec<_>>();
		if dirs.is_empty() {
			return Err("include_directories() needs at least one directory".to_owned());
		}
		if self.emitter.splits_headers() {
			return Ok(Arc::new(IncludeDirectories { name: String::new(), dirs, is_system: args.is_system }));
		}

		let name = rule_name(&dirs, args.is_system);
		if let Some(existing) = self.include_dirs.get(&name) {
			if existing.dirs != dirs {
				log::warn!(
					"include_directories \"{}\" already declared with {:?}; ignoring {:?}",
					name,
					existing.dirs,
					dirs
				);
			}
			return Ok(existing.clone());
		}
		let header_dirs = header_dir_set(&self.source_root, &dirs, &self.config.deep_include_dirs);
		let lines = self.emitter.include_directories(&name, &header_dirs);
		self.emit(&lines)?;
		let inc = Arc::new(IncludeDirectories { name: name.clone(), dirs, is_system: args.is_system });
		self.include_dirs.insert(name, inc.clone());
		Ok(inc)
	}

	pub fn dependency(&self, args: DependencyArgs) -> Result<Arc<Dependency>, String> {
		match self.config.ext_dependencies.get(&args.name) {
			Some(targets) => {
				log::info!("dependency: {} -> {:?}", args.name, targets);
				Ok(Arc::new(Dependency::external(&args.name, targets.clone())))
			}
			None if args.required => Err(format!(
				"Required dependency \"{}\" not found in project config \"{}\"",
				args.name, self.config.name
			)),
			None => {
				log::info!("dependency: {} not found", args.name);
				Ok(Arc::new(Dependency::not_found(&args.name)))
			}
		}
	}

	pub fn declare_dependency(&self, args: DeclareDependencyArgs) -> Arc<Dependency> {
		Arc::new(Dependency {
			name: format!("declared in {}", display_dir(&self.relative_dir)),
			found: true,
			sources: args.sources,
			include_directories: args.include_directories,
			compile_args: args.compile_args,
			link_with: args.link_with,
			link_whole: args.link_whole,
			dependencies: args.dependencies,
			targets: Vec::new(),
		})
	}

	fn library_rule(&self, args: &LibraryArgs, kind: LibraryKind) -> LibraryRule {
		let sources = partition_sources(&args.sources, &self.relative_dir, self.emitter.splits_headers());
		let deps = resolve(&args.dependencies);

		let mut include_dirs = Vec::new();
		let mut include_rules = deps.include_rules.clone();
		for inc in &args.include_directories {
			for dir in &inc.dirs {
				push_unique(&mut include_dirs, dir.clone());
			}
			if inc.is_rule() {
				include_rules.insert(inc.name.clone());
			}
		}
		for dir in &deps.include_dirs {
			push_unique(&mut include_dirs, dir.clone());
		}

		// Android turns warnings into errors; third-party code rarely survives that.
		let mut c_flags = vec!["-Wno-error".to_owned()];
		c_flags.extend(self.project.c_args.iter().chain(&args.c_args).chain(&deps.compile_args).cloned());
		let mut cpp_flags = vec!["-Wno-error".to_owned()];
		cpp_flags.extend(self.project.cpp_args.iter().chain(&args.cpp_args).chain(&deps.compile_args).cloned());

		let local_header_dirs = if self.emitter.globs_local_headers() {
			local_header_dirs(&self.source_root, &self.relative_dir)
		} else {
			Vec::new()
		};

		LibraryRule {
			name: args.name.clone(),
			kind,
			relative_dir: self.relative_dir.clone(),
			sources,
			c_std: self.project.c_std.clone(),
			cpp_std: self.project.cpp_std.clone(),
			c_flags,
			cpp_flags,
			include_dirs,
			include_rules,
			links: link_closure(&args.link_with, &args.link_whole),
			deps,
			local_header_dirs,
		}
	}

	pub fn static_library(&mut self, args: LibraryArgs) -> Result<Arc<StaticLibrary>, String> {
		log::info!("static_library: {}", args.name);
		let rule = self.library_rule(&args, LibraryKind::Static);
		let lines = self.emitter.library(&rule)?;
		self.emit(&lines)?;
		Ok(Arc::new(StaticLibrary { name: args.name, link_with: args.link_with, link_whole: args.link_whole }))
	}

	pub fn shared_library(&mut self, args: LibraryArgs) -> Result<Arc<SharedLibrary>, String> {
		log::info!("shared_library: {}", args.name);
		let rule = self.library_rule(&args, LibraryKind::Shared);
		let lines = self.emitter.library(&rule)?;
		self.emit(&lines)?;
		Ok(Arc::new(SharedLibrary { name: args.name }))
	}

	fn python_binary(&self, name: &str, script: &str, depend_files: &[String]) -> PythonBinary {
		let mut srcs = vec![script.to_owned()];
		for src in depend_files.iter().filter(|x| is_python_script(x)) {
			push_unique(&mut srcs, src.clone());
		}
		for src in sibling_scripts(&self.source_root, script) {
			push_unique(&mut srcs, src);
		}
		PythonBinary { name: name.to_owned(), main: script.to_owned(), srcs, libs: self.config.python_libs.clone() }
	}

	fn export_include_dirs(&self) -> Vec<String> {
		let mut dirs = vec![display_dir(&self.relative_dir).to_owned()];
		// Sources include generated files by paths relative to these roots.
		for root in &self.config.generated_include_roots {
			if self.relative_dir.starts_with(&format!("{}/", root)) {
				push_unique(&mut dirs, root.clone());
			}
		}
		dirs
	}

	pub fn custom_target(&mut self, args: CustomTargetArgs) -> Result<Arc<CustomTarget>, String> {
		let relative_dir = self.relative_dir.clone();
		// Generated files land under the declaring directory of the generated-files root.
		let outputs = args.output.iter().map(|x| join_relative(&relative_dir, x)).collect::<Vec<_>>();
		let target = Arc::new(CustomTarget::new(&args.name, outputs.clone(), self.emitter.splits_headers()));
		log::info!("custom_target: {} ({:?})", target.name, target.output_class());
		if outputs.is_empty() {
			return Err(format!("Custom target \"{}\" declares no outputs", target.name));
		}

		let template =
			CommandTemplate { args: &args.command, inputs: &args.input, outputs: &outputs, relative_dir: &relative_dir };
		let plain_args = synthesize(&template, self.emitter.as_ref(), false, Obfuscation::None)?;

		let depend_files = relative_inputs(&args.depend_files, &relative_dir, self.emitter.as_ref());
		let script = find_script(&args.program, &plain_args);
		let mut tools = Vec::new();
		if let Some(script) = &script {
			let binary = self.python_binary(&format!("{}_{}", target.name, basename(script)), script, &depend_files);
			let lines = self.emitter.python_binary(&binary);
			self.emit(&lines)?;
			tools.push(binary.name);
		}

		// The script stays in srcs so its directory can be located at run time.
		let mut srcs = relative_inputs(&args.input, &relative_dir, self.emitter.as_ref());
		if let Some(script) = &script {
			push_unique(&mut srcs, script.clone());
		}
		for src in depend_files {
			push_unique(&mut srcs, src);
		}
		for dep in &args.depends {
			for reference in self.emitter.target_references(dep) {
				push_unique(&mut srcs, reference);
			}
		}

		let invocation = self.emitter.program_invocation(&args.program);
		tools.extend(invocation.tools.iter().cloned());

		let halves = if target.split {
			vec![
				(target.header_rule_name(), Obfuscation::Sources, self.export_include_dirs()),
				(target.source_rule_name(), Obfuscation::NonSources, Vec::new()),
			]
		} else {
			vec![(target.name.clone(), Obfuscation::None, self.export_include_dirs())]
		};

		for (name, obfuscation, export_include_dirs) in halves {
			let mut cmd_args = vec![invocation.command.clone()];
			cmd_args.extend(synthesize(&template, self.emitter.as_ref(), true, obfuscation)?);
			if let Some(script) = &script {
				cmd_args = replace_script(cmd_args, script, &tools[0]);
				if let Some(env) = self.emitter.script_environment(script, &args.depends) {
					cmd_args.insert(0, env);
				}
			}

			let mut cmd = command_line(&cmd_args);
			if args.capture {
				cmd += &format!(" > {}", location(&obfuscation.rename(&outputs[0])));
			}
			// Scripts still write the suppressed outputs; replace them with placeholders.
			for out in outputs.iter().filter(|x| obfuscation.suppresses(x)) {
				cmd += &format!("; echo '{}' > {}", PLACEHOLDER_CONTENT, location(&obfuscation.rename(out)));
			}

			let rule = GenRule {
				name,
				srcs: srcs.clone(),
				outs: outputs.iter().map(|x| obfuscation.rename(x)).collect(),
				tools: tools.clone(),
				export_include_dirs,
				cmd,
			};
			let lines = self.emitter.genrule(&rule);
			self.emit(&lines)?;
		}
		Ok(target)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::sync::Mutex;

	use super::*;
	use crate::{
		command::CommandArg,
		config::{test_config, DependencyTargetType, ExtDependencyTarget},
		custom_target::CustomTargetItem,
		input::BuildInput,
	};

	#[derive(Clone, Default)]
	pub(crate) struct SharedBuffer(pub(crate) Arc<Mutex<Vec<u8>>>);

	impl Write for SharedBuffer {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}
		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	impl SharedBuffer {
		pub(crate) fn text(&self) -> String {
			String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
		}
	}

	pub(crate) fn test_context(backend: Backend, host: &str) -> (RunContext, SharedBuffer) {
		let buffer = SharedBuffer::default();
		let ctx = RunContext::new(
			test_config(host),
			backend,
			PathBuf::from("/nonexistent-source-root"),
			Box::new(buffer.clone()),
		);
		(ctx, buffer)
	}

	fn tokens(items: &[&str]) -> Vec<CommandArg> {
		items.iter().map(|x| CommandArg::Token(x.to_string())).collect()
	}

	fn gen_args() -> CustomTargetArgs {
		CustomTargetArgs {
			name: "gen".to_owned(),
			program: Program::find("tool.py", ""),
			command: tokens(&["@INPUT@", "--out-h", "@OUTPUT0@", "--out-c", "@OUTPUT1@"]),
			input: vec![BuildInput::Str("spec.xml".to_owned())],
			output: vec!["gen.h".to_owned(), "gen.c".to_owned()],
			..Default::default()
		}
	}

	#[test]
	fn test_mixed_target_on_soong() {
		let (mut ctx, buffer) = test_context(Backend::Soong, "android");
		let target = ctx.custom_target(gen_args()).unwrap();
		assert!(target.split);
		let text = buffer.text();

		assert_eq!(text.matches("python_binary_host {").count(), 1);
		assert!(text.contains("  name: \"gen_tool.py\",\n  main: \"tool.py\",\n"));
		assert_eq!(text.matches("genrule {").count(), 2);
		assert!(text.contains("  name: \"gen_h\",\n"));
		assert!(text.contains("  out: [\n    \"gen.h\",\n    \"gen.c.dummy.h\",\n  ],\n"));
		assert!(text.contains("  name: \"gen_c\",\n"));
		assert!(text.contains("  out: [\n    \"gen.h.dummy.c\",\n    \"gen.c\",\n  ],\n"));
		assert!(text.contains(
			"  cmd: \"PYTHONPATH=`dirname $(location tool.py)` $(location gen_tool.py) $(location spec.xml) \
			 --out-h $(location gen.h) --out-c $(location gen.c.dummy.h); \
			 echo '//nothing to see here' > $(location gen.c.dummy.h)\",\n"
		));
		assert!(text.contains("echo '//nothing to see here' > $(location gen.h.dummy.c)\",\n"));
		assert!(text.contains("  srcs: [\n    \"spec.xml\",\n    \"tool.py\",\n  ],\n"));
		assert!(text.contains("  tools: [\n    \"gen_tool.py\",\n  ],\n"));
		// Only the header half exports include dirs.
		assert_eq!(text.matches("export_include_dirs").count(), 1);
	}

	#[test]
	fn test_mixed_target_on_bazel() {
		let (mut ctx, buffer) = test_context(Backend::Bazel, "linux");
		let target = ctx.custom_target(gen_args()).unwrap();
		assert!(!target.split);
		let text = buffer.text();
		assert_eq!(text.matches("genrule(").count(), 1);
		assert_eq!(text.matches("py_binary(").count(), 1);
		assert!(text.contains("  outs = [\n    \"gen.h\",\n    \"gen.c\",\n  ],\n"));
		assert!(text.contains(
			"  cmd = \"$(location gen_tool.py) $(location spec.xml) --out-h $(location gen.h) --out-c $(location gen.c)\",\n"
		));
		assert!(!text.contains("PYTHONPATH"));
		assert!(!text.contains("dummy"));
	}

	#[test]
	fn test_bison_capture() {
		let (mut ctx, buffer) = test_context(Backend::Soong, "android");
		ctx.subdir("src/compiler/glsl");
		let args = CustomTargetArgs {
			name: "glsl_parser".to_owned(),
			program: ctx.find_program("bison"),
			command: tokens(&["@INPUT@", "--defines=@OUTPUT1@"]),
			input: vec![BuildInput::Str("glsl_parser.yy".to_owned())],
			output: vec!["glsl_parser.cpp".to_owned(), "glsl_parser.h".to_owned()],
			capture: true,
			..Default::default()
		};
		ctx.custom_target(args).unwrap();
		let text = buffer.text();
		assert!(text.contains("  tools: [\n    \"m4\",\n    \"bison\",\n  ],\n"));
		assert!(text.contains(
			"  cmd: \"M4=$(location m4) $(location bison) $(location src/compiler/glsl/glsl_parser.yy) \
			 --defines=$(location src/compiler/glsl/glsl_parser.h) \
			 > $(location src/compiler/glsl/glsl_parser.cpp.dummy.h); \
			 echo '//nothing to see here' > $(location src/compiler/glsl/glsl_parser.cpp.dummy.h)\",\n"
		));
		assert!(text.contains(
			"  out: [\n    \"src/compiler/glsl/glsl_parser.cpp.dummy.h\",\n    \"src/compiler/glsl/glsl_parser.h\",\n  ],\n"
		));
		assert!(text.contains("  export_include_dirs: [\n    \"src/compiler/glsl\",\n  ],\n"));
	}

	#[test]
	fn test_static_library_without_dependencies() {
		let (mut ctx, buffer) = test_context(Backend::Soong, "android");
		let lib = ctx
			.static_library(LibraryArgs {
				name: "foo".to_owned(),
				sources: vec![BuildInput::Str("foo.c".to_owned())],
				..Default::default()
			})
			.unwrap();
		assert_eq!(lib.name, "foo");
		let text = buffer.text();
		assert!(text.contains("  srcs: [\n    \"foo.c\",\n  ],\n"));
		for list in ["generated_headers", "static_libs", "whole_static_libs", "shared_libs", "header_libs"] {
			assert!(!text.contains(list), "{} in {}", list, text);
		}
	}

	#[test]
	fn test_include_directories_registry() {
		let (mut ctx, buffer) = test_context(Backend::Fuchsia, "fuchsia");
		ctx.subdir("src");
		let first = ctx.include_directories(IncludeDirectoriesArgs { dirs: vec!["mesa".to_owned()], is_system: false });
		let second = ctx.include_directories(IncludeDirectoriesArgs {
			dirs: vec!["mesa".to_owned(), "util".to_owned()],
			is_system: false,
		});
		let (first, second) = (first.unwrap(), second.unwrap());
		assert_eq!(first.name, "src_mesa");
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(buffer.text().matches("name = \"src_mesa\"").count(), 1);

		let (mut soong, soong_buffer) = test_context(Backend::Soong, "android");
		let inc = soong.include_directories(IncludeDirectoriesArgs { dirs: vec!["include".to_owned()], is_system: true });
		assert!(!inc.unwrap().is_rule());
		assert!(soong_buffer.text().is_empty());
	}

	#[test]
	fn test_dependency_lookup() {
		let buffer = SharedBuffer::default();
		let mut config = test_config("android");
		config.ext_dependencies.insert(
			"zlib".to_owned(),
			vec![ExtDependencyTarget { target_name: "libz".to_owned(), target_type: DependencyTargetType::SharedLibrary }],
		);
		let ctx = RunContext::new(config, Backend::Soong, PathBuf::from("."), Box::new(buffer));
		let zlib = ctx.dependency(DependencyArgs { name: "zlib".to_owned(), required: true }).unwrap();
		assert!(zlib.found);
		assert_eq!(zlib.targets[0].target_name, "libz");
		assert!(ctx.dependency(DependencyArgs { name: "libdrm".to_owned(), required: true }).is_err());
		let optional = ctx.dependency(DependencyArgs { name: "libdrm".to_owned(), required: false }).unwrap();
		assert!(!optional.found);
	}

	#[test]
	fn test_compiler_checks() {
		let buffer = SharedBuffer::default();
		let mut config = test_config("android");
		config.function_not_supported.functions = vec!["qsort_s".to_owned()];
		let ctx = RunContext::new(config, Backend::Soong, PathBuf::from("."), Box::new(buffer));
		let cc = ctx.get_compiler("c").unwrap();
		assert!(cc.has_function("qsort_r"));
		assert!(!cc.has_function("qsort_s"));
		assert_eq!(cc.id(), "clang");
		assert!(ctx.get_compiler("rust").is_err());
	}

	#[test]
	fn test_import_module() {
		let (ctx, _) = test_context(Backend::Soong, "android");
		assert_eq!(ctx.import_module("python"), Ok(ModuleKind::Python));
		assert_eq!(ctx.import_module("pkgconfig"), Ok(ModuleKind::PkgConfig));
		assert_eq!(
			ctx.import_module("gnome"),
			Err("Unhandled module: \"gnome\" for host machine: \"android\"".to_owned())
		);
		let (windows, _) = test_context(Backend::Bazel, "windows");
		assert!(windows.import_module("pkgconfig").is_err());
		assert!(windows.import_module("python").is_ok());
	}

	fn subdir_target_args(ctx: &RunContext) -> CustomTargetArgs {
		CustomTargetArgs {
			name: "u".to_owned(),
			program: ctx.find_program("gen.py"),
			command: tokens(&["--out", "@OUTPUT@", "--dir", "@CURRENT_BUILD_DIR@"]),
			output: vec!["u.h".to_owned()],
			..Default::default()
		}
	}

	#[test]
	fn test_subdir_target_on_soong() {
		let (mut ctx, buffer) = test_context(Backend::Soong, "android");
		ctx.subdir("src/util");
		let target = ctx.custom_target(subdir_target_args(&ctx)).unwrap();
		assert_eq!(target.outputs, vec!["src/util/u.h"]);
		let text = buffer.text();
		assert!(text.contains("  out: [\n    \"src/util/u.h\",\n  ],\n"));
		assert!(text.contains("  export_include_dirs: [\n    \"src/util\",\n  ],\n"));
		assert!(text.contains(
			"  cmd: \"PYTHONPATH=`dirname $(location src/util/gen.py)` $(location u_gen.py) \
			 --out $(location src/util/u.h) --dir $(genDir)/src/util\",\n"
		));
	}

	#[test]
	fn test_subdir_target_on_bazel() {
		let (mut ctx, buffer) = test_context(Backend::Bazel, "linux");
		ctx.subdir("src/util");
		let target = ctx.custom_target(subdir_target_args(&ctx)).unwrap();
		ctx.static_library(LibraryArgs {
			name: "util".to_owned(),
			sources: vec![BuildInput::Str("u_math.c".to_owned()), BuildInput::CustomTarget(target)],
			..Default::default()
		})
		.unwrap();
		let text = buffer.text();
		assert!(text.contains("  outs = [\n    \"src/util/u.h\",\n  ],\n"));
		assert!(text.contains("  cmd = \"$(location u_gen.py) --out $(location src/util/u.h) --dir $(GENDIR)/src/util\",\n"));
		// The library finds the header where the rule writes it.
		assert!(text.contains("  srcs = [\n    \"src/util/u_math.c\",\n    \"src/util/u.h\",\n  ],\n"));
		assert!(text.contains("    \"-I $(GENDIR)/src/util\",\n"));
	}

	fn item_args(items: Vec<BuildInput>) -> CustomTargetArgs {
		CustomTargetArgs {
			name: "use".to_owned(),
			program: Program::find("cat", ""),
			command: tokens(&["@INPUT@", "-o", "@OUTPUT@"]),
			input: items,
			output: vec!["use.txt".to_owned()],
			..Default::default()
		}
	}

	#[test]
	fn test_output_items_on_soong() {
		let (mut ctx, buffer) = test_context(Backend::Soong, "android");
		let gen = ctx.custom_target(gen_args()).unwrap();
		let items = vec![
			BuildInput::CustomTargetItem(CustomTargetItem::new(gen.clone(), 0).unwrap()),
			BuildInput::CustomTargetItem(CustomTargetItem::new(gen, 1).unwrap()),
		];
		ctx.custom_target(item_args(items)).unwrap();
		let text = buffer.text();
		assert!(text.contains("  srcs: [\n    \":gen_h\",\n    \":gen_c\",\n  ],\n"));
		assert!(text.contains("  cmd: \"cat $(location :gen_h) $(location :gen_c) -o $(location use.txt)\",\n"));
	}

	#[test]
	fn test_output_items_on_bazel() {
		let (mut ctx, buffer) = test_context(Backend::Bazel, "linux");
		ctx.subdir("src");
		let gen = ctx.custom_target(gen_args()).unwrap();
		let items = vec![BuildInput::CustomTargetItem(CustomTargetItem::new(gen, 1).unwrap())];
		ctx.custom_target(item_args(items)).unwrap();
		let text = buffer.text();
		assert!(text.contains("  outs = [\n    \"src/gen.h\",\n    \"src/gen.c\",\n  ],\n"));
		assert!(text.contains("  srcs = [\n    \"src/gen.c\",\n  ],\n"));
		assert!(text.contains("  cmd = \"cat $(location src/gen.c) -o $(location src/use.txt)\",\n"));
	}

	#[test]
	fn test_pkgconfig_generate() {
		let lib = StaticLibrary { name: "vulkan_util".to_owned(), link_with: Vec::new(), link_whole: Vec::new() };
		let (mut ctx, buffer) = test_context(Backend::Fuchsia, "fuchsia");
		ctx.pkgconfig_generate("vulkan_headers", Some(&lib)).unwrap();
		assert!(buffer.text().starts_with("# package library\ncc_library(\n  name = \"vulkan_headers\",\n"));

		let (mut soong, soong_buffer) = test_context(Backend::Soong, "android");
		soong.pkgconfig_generate("vulkan_headers", Some(&lib)).unwrap();
		assert!(soong_buffer.text().is_empty());
	}
}
