use std::sync::Arc;

use crate::custom_target::{CustomTarget, CustomTargetItem};

/// A source file, relative to the project root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct File {
	pub path: String,
}

#[derive(Clone, Debug)]
pub enum BuildInput {
	File(File),
	/// Path relative to the directory of the declaring call.
	Str(String),
	CustomTarget(Arc<CustomTarget>),
	CustomTargetItem(CustomTargetItem),
	List(Vec<BuildInput>),
}

impl BuildInput {
	/// Leaves of the input tree in declaration order.
	pub fn flatten(&self) -> Vec<&BuildInput> {
		match self {
			BuildInput::List(items) => items.iter().flat_map(|x| x.flatten()).collect(),
			other => vec![other],
		}
	}
}

pub(crate) fn flatten_all(inputs: &[BuildInput]) -> Vec<&BuildInput> {
	inputs.iter().flat_map(|x| x.flatten()).collect()
}

#[test]
fn test_flatten() {
	let target = Arc::new(CustomTarget::new("gen", vec!["gen.h".to_owned()], true));
	let inputs = vec![
		BuildInput::Str("a.c".to_owned()),
		BuildInput::List(vec![
			BuildInput::File(File { path: "src/b.c".to_owned() }),
			BuildInput::List(vec![BuildInput::CustomTarget(target)]),
		]),
	];
	let flat = flatten_all(&inputs);
	assert_eq!(flat.len(), 3);
	assert!(matches!(flat[0], BuildInput::Str(x) if x == "a.c"));
	assert!(matches!(flat[1], BuildInput::File(f) if f.path == "src/b.c"));
	assert!(matches!(flat[2], BuildInput::CustomTarget(t) if t.name == "gen"));
}
