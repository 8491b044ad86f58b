use std::sync::Arc;

use crate::{
	classify::OutputClass,
	misc::{is_header, is_source},
};

const HEADER_RULE_SUFFIX: &str = "_h";
const SOURCE_RULE_SUFFIX: &str = "_c";

/// A declared generation step. Outputs are relative to the generated-directory root.
#[derive(Debug)]
pub struct CustomTarget {
	pub name: String,
	pub outputs: Vec<String>,
	pub generates_headers: bool,
	pub generates_sources: bool,
	/// Emitted as separate header and source rules.
	pub split: bool,
}

/// Brackets are legal in upstream target names but not in rule names.
pub(crate) fn process_target_name(name: &str) -> String {
	name.chars().filter(|c| *c != '[' && *c != ']').collect()
}

impl CustomTarget {
	pub fn new(name: &str, outputs: Vec<String>, splits_headers: bool) -> CustomTarget {
		let generates_headers = outputs.iter().any(|x| is_header(x));
		let generates_sources = outputs.iter().any(|x| is_source(x));
		CustomTarget {
			name: process_target_name(name),
			outputs,
			generates_headers,
			generates_sources,
			split: splits_headers && generates_headers && generates_sources,
		}
	}

	pub fn output_class(&self) -> OutputClass {
		OutputClass::of(self.generates_headers, self.generates_sources)
	}

	pub fn header_rule_name(&self) -> String {
		if self.split {
			self.name.clone() + HEADER_RULE_SUFFIX
		} else {
			self.name.clone()
		}
	}

	pub fn source_rule_name(&self) -> String {
		if self.split {
			self.name.clone() + SOURCE_RULE_SUFFIX
		} else {
			self.name.clone()
		}
	}

	/// Names of every rule emitted for this target, in emission order.
	pub fn rule_names(&self) -> Vec<String> {
		if self.split {
			vec![self.header_rule_name(), self.source_rule_name()]
		} else {
			vec![self.name.clone()]
		}
	}

	/// The rule that really produces output `index`; the other half only writes a placeholder.
	pub fn rule_for_output(&self, index: usize) -> String {
		match self.outputs.get(index) {
			Some(out) if self.split && is_source(out) => self.source_rule_name(),
			_ => self.header_rule_name(),
		}
	}

	pub fn header_outputs(&self) -> Vec<String> {
		self.outputs.iter().filter(|x| is_header(x)).cloned().collect()
	}
}

#[derive(Clone, Debug)]
pub struct CustomTargetItem {
	pub target: Arc<CustomTarget>,
	pub index: usize,
}

impl CustomTargetItem {
	pub fn new(target: Arc<CustomTarget>, index: usize) -> Result<CustomTargetItem, String> {
		if index >= target.outputs.len() {
			return Err(format!(
				"Output index {} out of range for custom target \"{}\" with {} outputs",
				index,
				target.name,
				target.outputs.len()
			));
		}
		Ok(CustomTargetItem { target, index })
	}

	pub fn output(&self) -> &str {
		&self.target.outputs[self.index]
	}
}

#[test]
fn test_rule_names() {
	let outputs = vec!["gen.h".to_owned(), "gen.c".to_owned()];
	let split = CustomTarget::new("gen", outputs.clone(), true);
	assert!(split.split);
	assert_eq!(split.output_class(), OutputClass::Mixed);
	assert_eq!(split.rule_names(), vec!["gen_h".to_owned(), "gen_c".to_owned()]);
	assert_eq!(split.rule_for_output(0), "gen_h");
	assert_eq!(split.rule_for_output(1), "gen_c");
	assert_eq!(split.header_outputs(), vec!["gen.h".to_owned()]);

	let whole = CustomTarget::new("gen", outputs, false);
	assert!(!whole.split);
	assert_eq!(whole.header_rule_name(), "gen");
	assert_eq!(whole.source_rule_name(), "gen");
	assert_eq!(whole.rule_names(), vec!["gen".to_owned()]);

	let headers = CustomTarget::new("vk_enum[0]", vec!["vk_enum.h".to_owned()], true);
	assert_eq!(headers.name, "vk_enum0");
	assert!(!headers.split);
	assert_eq!(headers.output_class(), OutputClass::HeaderOnly);
}

#[test]
fn test_item_index() {
	let target = Arc::new(CustomTarget::new("gen", vec!["a.h".to_owned(), "b.c".to_owned()], true));
	let item = CustomTargetItem::new(target.clone(), 1).unwrap();
	assert_eq!(item.output(), "b.c");
	assert!(CustomTargetItem::new(target, 2).is_err());
}
