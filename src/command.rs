use std::slice;

use crate::{
	classify::Obfuscation,
	generator::{location, Emitter},
	input::{flatten_all, BuildInput, File},
	misc::{is_python_script, join_relative},
	program::Program,
};

const INPUT: &str = "@INPUT";
const OUTPUT: &str = "@OUTPUT";
const CURRENT_BUILD_DIR: &str = "@CURRENT_BUILD_DIR@";
const PROJECT_BUILD_ROOT: &str = "@PROJECT_BUILD_ROOT@";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandArg {
	Token(String),
	File(File),
	List(Vec<CommandArg>),
}

/// A custom target's command with everything its placeholders refer to.
pub struct CommandTemplate<'a> {
	pub args: &'a [CommandArg],
	pub inputs: &'a [BuildInput],
	pub outputs: &'a [String],
	pub relative_dir: &'a str,
}

/// Paths and labels of `inputs` as a generation rule refers to them.
pub fn relative_inputs(inputs: &[BuildInput], relative_dir: &str, emitter: &dyn Emitter) -> Vec<String> {
	let mut ret = Vec::new();
	for input in flatten_all(inputs) {
		match input {
			BuildInput::File(file) => ret.push(file.path.clone()),
			BuildInput::Str(path) => ret.push(join_relative(relative_dir, path)),
			BuildInput::CustomTarget(target) => ret.extend(emitter.target_references(target)),
			BuildInput::CustomTargetItem(item) => ret.push(emitter.item_reference(item)),
			BuildInput::List(_) => {}
		}
	}
	ret
}

/// Parses the index of `@INPUT@`/`@INPUT<N>@`-style placeholders from what follows the keyword.
/// `Some(None)` means "all".
fn placeholder_index(rest: &str) -> Option<Option<usize>> {
	let digits = rest.strip_suffix('@')?;
	if digits.is_empty() {
		return Some(None);
	}
	if !digits.chars().all(|c| c.is_ascii_digit()) {
		return None;
	}
	digits.parse().ok().map(Some)
}

fn wrap(path: String, location_wrap: bool) -> String {
	if location_wrap {
		location(&path)
	} else {
		path
	}
}

struct Synthesizer<'a> {
	template: &'a CommandTemplate<'a>,
	emitter: &'a dyn Emitter,
	location_wrap: bool,
	obfuscation: Obfuscation,
}

impl<'a> Synthesizer<'a> {
	fn inputs(&self, index: Option<usize>, args: &mut Vec<String>) -> Result<(), String> {
		let inputs = match index {
			None => self.template.inputs,
			Some(i) => match self.template.inputs.get(i) {
				Some(x) => slice::from_ref(x),
				None => {
					return Err(format!(
						"@INPUT{}@ out of range: command has {} inputs",
						i,
						self.template.inputs.len()
					))
				}
			},
		};
		for path in relative_inputs(inputs, self.template.relative_dir, self.emitter) {
			args.push(wrap(path, self.location_wrap));
		}
		Ok(())
	}

	fn outputs(&self, prefix: &str, index: Option<usize>, args: &mut Vec<String>) -> Result<(), String> {
		let outputs = match index {
			None => self.template.outputs,
			Some(i) => match self.template.outputs.get(i) {
				Some(x) => slice::from_ref(x),
				None => {
					return Err(format!(
						"@OUTPUT{}@ out of range: command has {} outputs",
						i,
						self.template.outputs.len()
					))
				}
			},
		};
		for out in outputs {
			args.push(prefix.to_owned() + &wrap(self.obfuscation.rename(out), self.location_wrap));
		}
		Ok(())
	}

	fn token(&self, token: &str, args: &mut Vec<String>) -> Result<(), String> {
		if let Some(index) = token.strip_prefix(INPUT).and_then(placeholder_index) {
			return self.inputs(index, args);
		}
		if let Some(pos) = token.rfind(OUTPUT) {
			if let Some(index) = placeholder_index(&token[pos + OUTPUT.len()..]) {
				return self.outputs(&token[..pos], index, args);
			}
		}
		if let Some(pos) = token.find(CURRENT_BUILD_DIR) {
			let dir = format!("{}/{}", self.emitter.gen_dir_marker(), self.template.relative_dir);
			args.push(format!(
				"{}{}{}",
				&token[..pos],
				dir.trim_end_matches('/'),
				&token[pos + CURRENT_BUILD_DIR.len()..]
			));
			return Ok(());
		}
		if self.emitter.expands_project_build_root() {
			if let Some(suffix) = token.strip_prefix(PROJECT_BUILD_ROOT) {
				args.push(self.emitter.gen_dir_marker().to_owned() + suffix);
				return Ok(());
			}
		}
		if token.contains(char::is_whitespace) {
			args.push(format!("'{}'", token));
		} else {
			args.push(token.to_owned());
		}
		Ok(())
	}

	fn arg(&self, arg: &CommandArg, args: &mut Vec<String>) -> Result<(), String> {
		match arg {
			CommandArg::Token(token) => self.token(token, args)?,
			CommandArg::File(file) => args.push(wrap(file.path.clone(), self.location_wrap)),
			CommandArg::List(items) => {
				for item in items {
					self.arg(item, args)?;
				}
			}
		}
		Ok(())
	}
}

/// Expands the placeholders of `template` into the argument list of one generation rule.
pub fn synthesize(
	template: &CommandTemplate,
	emitter: &dyn Emitter,
	location_wrap: bool,
	obfuscation: Obfuscation,
) -> Result<Vec<String>, String> {
	let synth = Synthesizer { template, emitter, location_wrap, obfuscation };
	let mut args = Vec::new();
	for arg in template.args {
		synth.arg(arg, &mut args)?;
	}
	Ok(args)
}

pub fn command_line(args: &[String]) -> String {
	args.join(" ")
}

/// The Python script a command runs: the program itself or the first argument naming one.
pub fn find_script(program: &Program, plain_args: &[String]) -> Option<String> {
	match program.script() {
		Some(x) => Some(x.to_owned()),
		None => plain_args.iter().find(|x| is_python_script(x)).cloned(),
	}
}

/// Points every reference to `script` at the interpreter binary built from it.
pub fn replace_script(args: Vec<String>, script: &str, binary: &str) -> Vec<String> {
	let script_location = location(script);
	let binary_location = location(binary);
	args.into_iter()
		.map(|x| {
			if x == script {
				binary_location.clone()
			} else {
				x.replace(&script_location, &binary_location)
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::{custom_target::CustomTarget, generator::Backend};

	fn tokens(items: &[&str]) -> Vec<CommandArg> {
		items.iter().map(|x| CommandArg::Token(x.to_string())).collect()
	}

	#[test]
	fn test_input_output_placeholders() {
		let emitter = Backend::Soong.emitter();
		let args = tokens(&["@INPUT0@", "prefix@OUTPUT@"]);
		let inputs = vec![BuildInput::Str("a.txt".to_owned()), BuildInput::Str("b.txt".to_owned())];
		let outputs = vec!["out.h".to_owned()];
		let template = CommandTemplate { args: &args, inputs: &inputs, outputs: &outputs, relative_dir: "" };

		let plain = synthesize(&template, emitter.as_ref(), false, Obfuscation::None).unwrap();
		assert_eq!(plain, vec!["a.txt", "prefixout.h"]);

		let wrapped = synthesize(&template, emitter.as_ref(), true, Obfuscation::None).unwrap();
		assert_eq!(wrapped, vec!["$(location a.txt)", "prefix$(location out.h)"]);
	}

	#[test]
	fn test_obfuscated_outputs() {
		let emitter = Backend::Soong.emitter();
		let args = tokens(&["--out-h", "@OUTPUT0@", "--out-c", "@OUTPUT1@", "@OUTPUT@"]);
		let outputs = vec!["gen.h".to_owned(), "gen.c".to_owned()];
		let template = CommandTemplate { args: &args, inputs: &[], outputs: &outputs, relative_dir: "src" };

		let header_half = synthesize(&template, emitter.as_ref(), true, Obfuscation::Sources).unwrap();
		assert_eq!(
			command_line(&header_half),
			"--out-h $(location gen.h) --out-c $(location gen.c.dummy.h) $(location gen.h) $(location gen.c.dummy.h)"
		);
		let source_half = synthesize(&template, emitter.as_ref(), true, Obfuscation::NonSources).unwrap();
		assert_eq!(source_half[1], "$(location gen.h.dummy.c)");
		assert_eq!(source_half[3], "$(location gen.c)");
	}

	#[test]
	fn test_directory_placeholders() {
		let soong = Backend::Soong.emitter();
		let bazel = Backend::Bazel.emitter();
		let args = tokens(&["-I@CURRENT_BUILD_DIR@", "@PROJECT_BUILD_ROOT@/src", "two words"]);
		let template = CommandTemplate { args: &args, inputs: &[], outputs: &[], relative_dir: "src/util" };

		let soong_args = synthesize(&template, soong.as_ref(), true, Obfuscation::None).unwrap();
		assert_eq!(soong_args, vec!["-I$(genDir)/src/util", "@PROJECT_BUILD_ROOT@/src", "'two words'"]);
		let bazel_args = synthesize(&template, bazel.as_ref(), true, Obfuscation::None).unwrap();
		assert_eq!(bazel_args, vec!["-I$(GENDIR)/src/util", "$(GENDIR)/src", "'two words'"]);

		let root = CommandTemplate { args: &args[..1], inputs: &[], outputs: &[], relative_dir: "" };
		assert_eq!(synthesize(&root, soong.as_ref(), true, Obfuscation::None).unwrap(), vec!["-I$(genDir)"]);
	}

	#[test]
	fn test_out_of_range() {
		let emitter = Backend::Bazel.emitter();
		let args = tokens(&["@INPUT2@"]);
		let inputs = vec![BuildInput::Str("a.txt".to_owned())];
		let template = CommandTemplate { args: &args, inputs: &inputs, outputs: &[], relative_dir: "" };
		assert!(synthesize(&template, emitter.as_ref(), false, Obfuscation::None).is_err());

		let args = tokens(&["@OUTPUT1@"]);
		let outputs = vec!["a.h".to_owned()];
		let template = CommandTemplate { args: &args, inputs: &[], outputs: &outputs, relative_dir: "" };
		assert!(synthesize(&template, emitter.as_ref(), false, Obfuscation::None).is_err());
	}

	#[test]
	fn test_target_inputs() {
		let gen = Arc::new(CustomTarget::new("gen", vec!["gen.h".to_owned(), "gen.c".to_owned()], true));
		let inputs = vec![
			BuildInput::CustomTarget(gen.clone()),
			BuildInput::List(vec![BuildInput::File(File { path: "src/a.xml".to_owned() })]),
		];
		let soong = Backend::Soong.emitter();
		assert_eq!(relative_inputs(&inputs, "", soong.as_ref()), vec![":gen_h", ":gen_c", "src/a.xml"]);

		let whole = Arc::new(CustomTarget::new("gen", vec!["gen.h".to_owned(), "gen.c".to_owned()], false));
		let bazel = Backend::Bazel.emitter();
		let inputs = vec![BuildInput::CustomTarget(whole)];
		assert_eq!(relative_inputs(&inputs, "", bazel.as_ref()), vec![":gen"]);
	}

	#[test]
	fn test_script_helpers() {
		let args = vec!["$(location src/gen.py)".to_owned(), "--in".to_owned(), "src/gen.py".to_owned()];
		assert_eq!(
			replace_script(args, "src/gen.py", "gen_gen.py"),
			vec!["$(location gen_gen.py)", "--in", "$(location gen_gen.py)"]
		);
		let plain = vec!["--x".to_owned(), "tools/a.py".to_owned(), "b.py".to_owned()];
		assert_eq!(find_script(&Program::Tool("python3".to_owned()), &plain), Some("tools/a.py".to_owned()));
		assert_eq!(find_script(&Program::Script("s.py".to_owned()), &plain), Some("s.py".to_owned()));
		assert_eq!(find_script(&Program::Tool("bison".to_owned()), &[]), None);
	}
}
