use std::collections::BTreeSet;

use crate::{
	custom_target::CustomTarget,
	input::BuildInput,
	misc::{is_c_source, is_header, is_source, join_relative},
};

/// What a custom target's declared outputs contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputClass {
	HeaderOnly,
	SourceOnly,
	Mixed,
	Other,
}

impl OutputClass {
	pub fn of(generates_headers: bool, generates_sources: bool) -> OutputClass {
		match (generates_headers, generates_sources) {
			(true, true) => OutputClass::Mixed,
			(true, false) => OutputClass::HeaderOnly,
			(false, true) => OutputClass::SourceOnly,
			(false, false) => OutputClass::Other,
		}
	}
}

/// Output renaming applied to one half of a split custom target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Obfuscation {
	None,
	/// Header half: source outputs become `<out>.dummy.h`.
	Sources,
	/// Source half: every non-source output becomes `<out>.dummy.c`.
	NonSources,
}

impl Obfuscation {
	pub fn suffix(self) -> &'static str {
		match self {
			Obfuscation::None => "",
			Obfuscation::Sources => ".dummy.h",
			Obfuscation::NonSources => ".dummy.c",
		}
	}

	pub fn suppresses(self, output: &str) -> bool {
		match self {
			Obfuscation::None => false,
			Obfuscation::Sources => is_source(output),
			Obfuscation::NonSources => !is_source(output),
		}
	}

	pub fn rename(self, output: &str) -> String {
		if self.suppresses(output) {
			output.to_owned() + self.suffix()
		} else {
			output.to_owned()
		}
	}
}

/// The inputs of a library split the way the emitted rule consumes them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SourcePartition {
	/// Declaration order, no duplicates.
	pub sources: Vec<String>,
	pub generated_sources: BTreeSet<String>,
	pub generated_headers: BTreeSet<String>,
}

impl SourcePartition {
	fn add_source(&mut self, source: String) {
		if !self.sources.contains(&source) {
			self.sources.push(source);
		}
	}

	fn add_target(&mut self, target: &CustomTarget, output: Option<&str>, splits_headers: bool) {
		if splits_headers {
			if target.generates_headers {
				self.generated_headers.insert(target.header_rule_name());
			}
			if target.generates_sources {
				self.generated_sources.insert(target.source_rule_name());
			}
			return;
		}
		self.generated_sources.insert(target.name.clone());
		match output {
			Some(out) => self.add_source(out.to_owned()),
			None => {
				for out in &target.outputs {
					self.add_source(out.clone());
				}
			}
		}
	}

	pub fn has_c_sources(&self) -> bool {
		self.sources.iter().any(|x| is_c_source(x))
	}

	/// Sources with headers filtered out, for backends that list headers elsewhere.
	pub fn non_header_sources(&self) -> impl Iterator<Item = &String> {
		self.sources.iter().filter(|x| !is_header(x))
	}

	fn add_input(&mut self, input: &BuildInput, relative_dir: &str, splits_headers: bool) {
		match input {
			BuildInput::File(file) => self.add_source(file.path.clone()),
			BuildInput::Str(path) => self.add_source(join_relative(relative_dir, path)),
			BuildInput::CustomTarget(target) => self.add_target(target, None, splits_headers),
			BuildInput::CustomTargetItem(item) => self.add_target(&item.target, Some(item.output()), splits_headers),
			BuildInput::List(items) => {
				for item in items {
					self.add_input(item, relative_dir, splits_headers);
				}
			}
		}
	}
}

pub fn partition_sources(inputs: &[BuildInput], relative_dir: &str, splits_headers: bool) -> SourcePartition {
	let mut partition = SourcePartition::default();
	for input in inputs {
		partition.add_input(input, relative_dir, splits_headers);
	}
	partition
}

#[cfg(test)]
fn sample_inputs() -> Vec<BuildInput> {
	use crate::{custom_target::CustomTargetItem, input::File};
	use std::sync::Arc;

	let gen = Arc::new(CustomTarget::new("gen", vec!["gen.h".to_owned(), "gen.c".to_owned()], true));
	let tables = Arc::new(CustomTarget::new("tables", vec!["a.h".to_owned(), "b.c".to_owned()], false));
	vec![
		BuildInput::Str("main.c".to_owned()),
		BuildInput::File(File { path: "src/util/u.c".to_owned() }),
		BuildInput::Str("main.c".to_owned()),
		BuildInput::List(vec![
			BuildInput::CustomTarget(gen),
			BuildInput::CustomTargetItem(CustomTargetItem::new(tables, 1).unwrap()),
		]),
		BuildInput::Str("private.h".to_owned()),
	]
}

#[test]
fn test_partition_split() {
	let partition = partition_sources(&sample_inputs(), "src/mesa", true);
	assert_eq!(
		partition.sources,
		vec!["src/mesa/main.c".to_owned(), "src/util/u.c".to_owned(), "src/mesa/private.h".to_owned()]
	);
	assert_eq!(partition.generated_headers.iter().collect::<Vec<_>>(), vec!["gen_h", "tables"]);
	assert_eq!(partition.generated_sources.iter().collect::<Vec<_>>(), vec!["gen_c", "tables"]);
	assert_eq!(partition.non_header_sources().count(), 2);
	assert!(partition.has_c_sources());
}

#[test]
fn test_partition_whole() {
	let partition = partition_sources(&sample_inputs(), "", false);
	assert_eq!(
		partition.sources,
		vec![
			"main.c".to_owned(),
			"src/util/u.c".to_owned(),
			"gen.h".to_owned(),
			"gen.c".to_owned(),
			"b.c".to_owned(),
			"private.h".to_owned(),
		]
	);
	assert!(partition.generated_headers.is_empty());
	assert_eq!(partition.generated_sources.iter().collect::<Vec<_>>(), vec!["gen", "tables"]);
}

#[test]
fn test_obfuscation() {
	assert_eq!(OutputClass::of(false, false), OutputClass::Other);
	assert_eq!(OutputClass::of(false, true), OutputClass::SourceOnly);
	assert_eq!(Obfuscation::Sources.rename("gen.c"), "gen.c.dummy.h");
	assert_eq!(Obfuscation::Sources.rename("gen.h"), "gen.h");
	assert_eq!(Obfuscation::NonSources.rename("gen.h"), "gen.h.dummy.c");
	assert_eq!(Obfuscation::NonSources.rename("gen.txt"), "gen.txt.dummy.c");
	assert_eq!(Obfuscation::NonSources.rename("gen.c"), "gen.c");
	assert_eq!(Obfuscation::None.rename("gen.c"), "gen.c");
}

#[test]
fn test_c_sources() {
	let cpp = partition_sources(&[BuildInput::Str("glsl_parser.cpp".to_owned())], "", true);
	assert!(!cpp.has_c_sources());
	let header = partition_sources(&[BuildInput::Str("u_math.h".to_owned())], "", true);
	assert!(!header.has_c_sources());
}
