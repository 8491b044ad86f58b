use std::{
	collections::BTreeMap, //
	fs,
	path::Path,
};

use serde::Deserialize;

/// Contents of a configuration file: one build-system identifier shared by every
/// `[[project_config]]` table in the file.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
	pub build: String,
	pub project_config: Vec<ProjectConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProjectConfig {
	pub name: String,
	pub host_machine: MachineInfo,
	#[serde(default)]
	pub meson_options: BTreeMap<String, OptionValue>,
	#[serde(default)]
	pub header_not_supported: HeaderList,
	#[serde(default)]
	pub symbol_not_supported: SymbolList,
	#[serde(default)]
	pub function_not_supported: FunctionList,
	#[serde(default)]
	pub link_not_supported: LinkList,
	#[serde(default)]
	pub ext_dependencies: BTreeMap<String, Vec<ExtDependencyTarget>>,

	/// Libraries every Soong `python_binary_host` links against.
	#[serde(default)]
	pub python_libs: Vec<String>,
	/// Include directories whose subdirectories are globbed two levels deep.
	#[serde(default)]
	pub deep_include_dirs: Vec<String>,
	/// Roots added to a genrule's `export_include_dirs` when the rule lives below them.
	#[serde(default)]
	pub generated_include_roots: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MachineInfo {
	pub cpu_family: String,
	pub cpu: String,
	pub host_machine: String,
	#[serde(default)]
	pub build_machine: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HeaderList {
	#[serde(default)]
	pub headers: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SymbolList {
	#[serde(default)]
	pub symbols: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FunctionList {
	#[serde(default)]
	pub functions: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LinkList {
	#[serde(default)]
	pub links: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
	Bool(bool),
	Int(i64),
	Str(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyTargetType {
	SharedLibrary,
	StaticLibrary,
	HeaderLibrary,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExtDependencyTarget {
	pub target_name: String,
	#[serde(alias = "target_kind")]
	pub target_type: DependencyTargetType,
}

impl ProjectConfig {
	pub fn host(&self) -> &str {
		&self.host_machine.host_machine
	}

	pub fn option(&self, name: &str) -> Option<&OptionValue> {
		self.meson_options.get(name)
	}
}

impl ConfigFile {
	/// Removes and returns the project config at `index`. Only one config is active per run.
	pub fn select(mut self, index: usize) -> Result<ProjectConfig, String> {
		if index >= self.project_config.len() {
			return Err(format!(
				"Config index {} out of range: config file defines {} project_config entries",
				index,
				self.project_config.len()
			));
		}
		Ok(self.project_config.swap_remove(index))
	}
}

pub fn parse_config(text: &str, origin: &str) -> Result<ConfigFile, String> {
	let config = match toml::from_str::<ConfigFile>(text) {
		Ok(x) => x,
		Err(e) => return Err(format!("Error reading config file \"{}\": {}", origin, e)),
	};
	if config.project_config.is_empty() {
		return Err(format!("Config file \"{}\" contains no [[project_config]] entries", origin));
	}
	Ok(config)
}

pub fn read_config(config_path: &Path) -> Result<ConfigFile, String> {
	let config_toml = match fs::read_to_string(config_path) {
		Ok(x) => x,
		Err(e) => return Err(format!("Error opening config file \"{}\": {}", config_path.display(), e)),
	};
	parse_config(&config_toml, &config_path.display().to_string())
}

#[cfg(test)]
pub(crate) fn test_config(host: &str) -> ProjectConfig {
	ProjectConfig {
		name: "test".to_owned(),
		host_machine: MachineInfo {
			cpu_family: "x86_64".to_owned(),
			cpu: "x86_64".to_owned(),
			host_machine: host.to_owned(),
			build_machine: "linux".to_owned(),
		},
		meson_options: BTreeMap::new(),
		header_not_supported: HeaderList::default(),
		symbol_not_supported: SymbolList::default(),
		function_not_supported: FunctionList::default(),
		link_not_supported: LinkList::default(),
		ext_dependencies: BTreeMap::new(),
		python_libs: Vec::new(),
		deep_include_dirs: Vec::new(),
		generated_include_roots: Vec::new(),
	}
}

#[test]
fn test_parse_config() {
	let text = r#"
build = "soong"

[[project_config]]
name = "android_x86_64"

[project_config.host_machine]
cpu_family = "x86_64"
cpu = "x86_64"
host_machine = "android"
build_machine = "linux"

[project_config.meson_options]
platforms = "android"
llvm = false
max_width = 16

[project_config.header_not_supported]
headers = ["xlocale.h"]

[project_config.ext_dependencies]
zlib = [{ target_name = "libz", target_type = "shared_library" }]
expat = [
  { target_name = "libexpat", target_kind = "static_library" },
  { target_name = "libexpat_headers", target_type = "header_library" },
]

[[project_config]]
name = "android_arm64"

[project_config.host_machine]
cpu_family = "aarch64"
cpu = "aarch64"
host_machine = "android"
"#;
	let config = parse_config(text, "aosp.toml").expect("config should parse");
	assert_eq!(config.build, "soong");
	assert_eq!(config.project_config.len(), 2);

	let first = config.select(0).unwrap();
	assert_eq!(first.name, "android_x86_64");
	assert_eq!(first.host(), "android");
	assert_eq!(first.option("platforms"), Some(&OptionValue::Str("android".to_owned())));
	assert_eq!(first.option("llvm"), Some(&OptionValue::Bool(false)));
	assert_eq!(first.option("max_width"), Some(&OptionValue::Int(16)));
	assert_eq!(first.header_not_supported.headers, vec!["xlocale.h".to_owned()]);
	assert!(first.symbol_not_supported.symbols.is_empty());

	let expat = &first.ext_dependencies["expat"];
	assert_eq!(expat.len(), 2);
	assert_eq!(expat[0].target_type, DependencyTargetType::StaticLibrary);
	assert_eq!(expat[1].target_type, DependencyTargetType::HeaderLibrary);
	assert_eq!(first.ext_dependencies["zlib"][0].target_name, "libz");
}

#[test]
fn test_select_out_of_range() {
	let text = r#"
build = "bazel"
[[project_config]]
name = "fuchsia"
[project_config.host_machine]
cpu_family = "x86_64"
cpu = "x86_64"
host_machine = "fuchsia"
"#;
	let config = parse_config(text, "fuchsia.toml").unwrap();
	let err = config.select(3).unwrap_err();
	assert!(err.contains("out of range"), "{}", err);
}

#[test]
fn test_empty_config_rejected() {
	let err = parse_config("build = \"soong\"\nproject_config = []\n", "empty.toml").unwrap_err();
	assert!(err.contains("no [[project_config]]"), "{}", err);
}
