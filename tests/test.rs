use std::{
	fs, //
	path::PathBuf,
};

use hermetic::{translate, TranslateOptions};

const SOURCE_DIR: &str = "test_data/mesa_lite";

fn output_dir(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

fn translate_mesa_lite(config: &str, config_index: usize, out: &str) -> String {
	let opts = TranslateOptions {
		config: PathBuf::from(SOURCE_DIR).join(config),
		build_file: PathBuf::from(SOURCE_DIR).join("build.star"),
		source_dir: PathBuf::from(SOURCE_DIR),
		output_dir: output_dir(out),
		config_index,
	};
	let path = translate(&opts).unwrap();
	fs::read_to_string(path).unwrap()
}

/// Writes a one-off project and translates it.
fn translate_scratch(name: &str, config: &str, build: &str, config_index: usize) -> Result<PathBuf, String> {
	let dir = output_dir(name);
	fs::create_dir_all(&dir).unwrap();
	fs::write(dir.join("config.toml"), config).unwrap();
	fs::write(dir.join("build.star"), build).unwrap();
	let opts = TranslateOptions {
		config: dir.join("config.toml"),
		build_file: dir.join("build.star"),
		source_dir: dir.clone(),
		output_dir: dir,
		config_index,
	};
	translate(&opts).map_err(|e| e.to_string())
}

const LINUX_CONFIG: &str = r#"
build = "bazel"

[[project_config]]
name = "linux"

[project_config.host_machine]
cpu_family = "x86_64"
cpu = "x86_64"
host_machine = "linux"
build_machine = "linux"
"#;

#[test]
fn test_soong() {
	let text = translate_mesa_lite("soong.toml", 0, "soong");

	assert!(text.contains("python_binary_host {\n  name: \"u_tables_gen_tables.py\",\n  main: \"src/util/gen_tables.py\","));
	assert!(text.contains("  libs: [\n    \"mako\",\n  ],"));
	assert!(text.contains("genrule {\n  name: \"u_tables_h\","));
	assert!(text.contains("genrule {\n  name: \"u_tables_c\","));
	assert!(text.contains(
		"  srcs: [\n    \"src/util/tables.xml\",\n    \"src/util/gen_tables.py\",\n    \"src/util/tables_helper.py\",\n  ],"
	));
	assert!(text.contains(
		"  cmd: \"PYTHONPATH=`dirname $(location src/util/gen_tables.py)` python3 $(location u_tables_gen_tables.py) \
		 $(location src/util/tables.xml) --header $(location src/util/u_tables.h) \
		 --code $(location src/util/u_tables.c.dummy.h); \
		 echo '//nothing to see here' > $(location src/util/u_tables.c.dummy.h)\","
	));
	assert!(text.contains("  export_include_dirs: [\n    \"src/util\",\n    \"src\",\n  ],"));

	let mesa_util = "cc_library_static {
  name: \"mesa_util\",
  srcs: [
    \"src/util/u_math.c\",
  ],
  generated_headers: [
    \"u_tables_h\",
  ],
  generated_sources: [
    \"u_tables_c\",
  ],
  c_std: \"c11\",
  cpp_std: \"c++17\",
  conlyflags: [
    \"-Wno-error\",
    \"-DHAVE_PTHREAD\",
    \"-DHAVE_REALLOCARRAY\",
    \"-DUTIL_NAME=\\\"mesa\\\"\",
  ],";
	assert!(text.contains(mesa_util), "{}", text);
	assert!(!text.contains("-DHAVE_XLOCALE_H"));
	assert!(!text.contains("-DHAVE_VALGRIND"));

	assert!(text.contains("python_binary_host {\n  name: \"vk_enum_gen_enum.py\","));
	assert!(text.contains("--out $(location src/vulkan/vk_enum.h) --dir $(genDir)/src/vulkan"));
	assert!(text.contains("  out: [\n    \"src/vulkan/vk_enum.h\",\n  ],"));
	assert!(text.contains("`dirname $(location :u_tables_h)`"));

	let vulkan = text.split("cc_library_shared {").nth(1).unwrap();
	assert!(vulkan.contains("  name: \"vulkan_lite\","));
	assert!(vulkan.contains("    \"vk_enum\",\n"));
	assert!(vulkan.contains("  static_libs: [\n    \"mesa_util\",\n  ],"));
	assert!(vulkan.contains("  shared_libs: [\n    \"libz\",\n  ],"));
	assert!(vulkan.contains("    \"-DUSE_MESA_UTIL\",\n"));
}

#[test]
fn test_bazel() {
	let text = translate_mesa_lite("bazel.toml", 0, "bazel");

	assert!(text.contains("# header library\ncc_library(\n  name = \"include\","));
	assert!(text.contains("py_binary(\n  name = \"u_tables_gen_tables.py\","));
	assert!(text.contains("genrule(\n  name = \"u_tables\","));
	assert!(text.contains("  outs = [\n    \"src/util/u_tables.h\",\n    \"src/util/u_tables.c\",\n  ],"));
	assert!(text.contains(
		"  cmd = \"python3 $(location u_tables_gen_tables.py) $(location src/util/tables.xml) \
		 --header $(location src/util/u_tables.h) --code $(location src/util/u_tables.c)\","
	));
	assert!(!text.contains("dummy"));

	assert!(text.contains("cc_library(\n  name = \"mesa_util\","));
	assert!(text.contains("cc_library(\n  name = \"_vulkan_lite\","));
	assert!(text.contains("cc_shared_library("));
	assert!(text.contains("\"@zlib//:z\""));
	assert!(text.contains("\":u_tables\""));
	assert!(text.contains("    \"-I $(GENDIR)/src/util\",\n"));
	assert!(!text.contains("target_compatible_with"));
	assert!(!text.contains("# package library"));
}

#[test]
fn test_fuchsia() {
	let text = translate_mesa_lite("bazel.toml", 1, "fuchsia");

	assert!(!text.contains("u_tables"));
	assert!(!text.contains("-DHAVE_REALLOCARRAY"));
	assert!(text.contains("-DHAVE_PTHREAD"));
	assert!(text.contains("target_compatible_with"));
	assert!(text.contains("\"//third_party/zlib\""));
	assert!(text.contains("genrule(\n  name = \"vk_enum\","));
	assert!(text.contains("# package library\ncc_library(\n  name = \"mesa_util_pc\",\n"));
}

#[test]
fn test_unknown_module() {
	let err = translate_scratch("unknown_module", LINUX_CONFIG, "project(\"x\")\nimport_module(\"gnome\")\n", 0)
		.unwrap_err();
	assert!(err.contains("Unhandled module: \"gnome\""), "{}", err);
}

#[test]
fn test_missing_required_dependency() {
	let err = translate_scratch("missing_dependency", LINUX_CONFIG, "project(\"x\")\ndependency(\"expat\")\n", 0)
		.unwrap_err();
	assert!(err.contains("Required dependency \"expat\" not found"), "{}", err);

	let path = translate_scratch(
		"optional_dependency",
		LINUX_CONFIG,
		"project(\"x\")\nd = dependency(\"expat\", required = False)\nif d.found():\n    fail(\"found\")\n",
		0,
	)
	.unwrap();
	assert!(path.ends_with("BUILD.bazel"));
}

#[test]
fn test_bad_config() {
	assert!(translate_scratch("bad_index", LINUX_CONFIG, "project(\"x\")\n", 3).is_err());

	let make = LINUX_CONFIG.replace("build = \"bazel\"", "build = \"make\"");
	assert!(translate_scratch("bad_build", &make, "project(\"x\")\n", 0).is_err());
}
