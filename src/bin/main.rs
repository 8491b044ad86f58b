use std::{
	path::PathBuf, //
	process::ExitCode,
};

use clap::{value_parser, Arg, Command};

use hermetic::TranslateOptions;

const CONFIG: &str = "config";
const BUILD_FILE: &str = "build-file";
const SOURCE_DIR: &str = "source-dir";
const OUTPUT_DIR: &str = "output-dir";
const CONFIG_INDEX: &str = "config-index";

fn command() -> Command {
	Command::new("hermetic")
		.about("Translates a Meson-style build description into Android.bp or BUILD.bazel")
		.arg(
			Arg::new(CONFIG)
				.long(CONFIG)
				.value_name("FILE")
				.help("Project config (TOML)")
				.required(true)
				.value_parser(value_parser!(PathBuf)),
		)
		.arg(
			Arg::new(BUILD_FILE)
				.long(BUILD_FILE)
				.value_name("FILE")
				.help("Build description to translate")
				.required(true)
				.value_parser(value_parser!(PathBuf)),
		)
		.arg(
			Arg::new(SOURCE_DIR)
				.long(SOURCE_DIR)
				.value_name("DIR")
				.help("Source tree root; defaults to the build description's directory")
				.value_parser(value_parser!(PathBuf)),
		)
		.arg(
			Arg::new(OUTPUT_DIR)
				.long(OUTPUT_DIR)
				.value_name("DIR")
				.help("Where the build file is written; defaults to the source tree root")
				.value_parser(value_parser!(PathBuf)),
		)
		.arg(
			Arg::new(CONFIG_INDEX)
				.long(CONFIG_INDEX)
				.value_name("N")
				.help("Index of the active [[project_config]] table")
				.default_value("0")
				.value_parser(value_parser!(usize)),
		)
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("HERMETIC_LOG", "info"))
		.format_timestamp(None)
		.init();

	let matches = command().get_matches();
	let config = matches.get_one::<PathBuf>(CONFIG).cloned().unwrap_or_default();
	let build_file = matches.get_one::<PathBuf>(BUILD_FILE).cloned().unwrap_or_default();
	let source_dir = match matches.get_one::<PathBuf>(SOURCE_DIR) {
		Some(x) => x.clone(),
		None => build_file.parent().map(PathBuf::from).unwrap_or_default(),
	};
	let output_dir = matches.get_one::<PathBuf>(OUTPUT_DIR).cloned().unwrap_or_else(|| source_dir.clone());
	let config_index = matches.get_one::<usize>(CONFIG_INDEX).copied().unwrap_or(0);

	let opts = TranslateOptions { config, build_file, source_dir, output_dir, config_index };
	match hermetic::translate(&opts) {
		Ok(path) => {
			println!("Wrote {}", path.display());
			ExitCode::SUCCESS
		}
		Err(e) => {
			println!("Error: {}", e);
			ExitCode::FAILURE
		}
	}
}

#[test]
fn test_command() {
	command().debug_assert();
	let matches = command()
		.try_get_matches_from(["hermetic", "--config", "c.toml", "--build-file", "meson.star", "--config-index", "2"])
		.unwrap();
	assert_eq!(matches.get_one::<usize>(CONFIG_INDEX), Some(&2));
	assert!(matches.get_one::<PathBuf>(SOURCE_DIR).is_none());
	assert!(command().try_get_matches_from(["hermetic", "--config", "c.toml"]).is_err());
}
