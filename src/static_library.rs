use std::sync::Arc;

#[derive(Debug)]
pub struct StaticLibrary {
	pub name: String,
	pub link_with: Vec<Arc<StaticLibrary>>,
	pub link_whole: Vec<Arc<StaticLibrary>>,
}

#[derive(Debug)]
pub struct SharedLibrary {
	pub name: String,
}

impl StaticLibrary {
	/// Every library reachable through `link_with` and `link_whole`, breadth-first.
	pub fn links_recursive(&self) -> Vec<Arc<StaticLibrary>> {
		let mut links: Vec<Arc<StaticLibrary>> = Vec::new();
		let mut queue: Vec<Arc<StaticLibrary>> = self.link_with.iter().chain(&self.link_whole).cloned().collect();
		while !queue.is_empty() {
			let mut next = Vec::new();
			for link in queue {
				if links.iter().any(|x| Arc::ptr_eq(x, &link)) {
					continue;
				}
				next.extend(link.link_with.iter().cloned());
				next.extend(link.link_whole.iter().cloned());
				links.push(link);
			}
			queue = next;
		}
		links
	}
}

/// Names a consuming rule must list so that every static library it needs gets linked.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LinkClosure {
	pub static_libs: Vec<String>,
	pub whole_static_libs: Vec<String>,
}

pub fn link_closure(link_with: &[Arc<StaticLibrary>], link_whole: &[Arc<StaticLibrary>]) -> LinkClosure {
	let mut closure = LinkClosure::default();
	for lib in link_whole {
		if !closure.whole_static_libs.contains(&lib.name) {
			closure.whole_static_libs.push(lib.name.clone());
		}
	}
	let mut add_static = |name: &String| {
		if !closure.whole_static_libs.contains(name) && !closure.static_libs.contains(name) {
			closure.static_libs.push(name.clone());
		}
	};
	// Static libraries have to be linked all the way down; the archive doesn't carry its links.
	for lib in link_with {
		add_static(&lib.name);
	}
	for lib in link_with.iter().chain(link_whole) {
		for link in lib.links_recursive() {
			add_static(&link.name);
		}
	}
	closure
}

#[test]
fn test_link_closure() {
	let util = Arc::new(StaticLibrary { name: "util".to_owned(), link_with: Vec::new(), link_whole: Vec::new() });
	let compiler = Arc::new(StaticLibrary {
		name: "compiler".to_owned(),
		link_with: vec![util.clone()],
		link_whole: Vec::new(),
	});
	let nir = Arc::new(StaticLibrary {
		name: "nir".to_owned(),
		link_with: vec![util.clone()],
		link_whole: vec![compiler.clone()],
	});

	assert_eq!(nir.links_recursive().len(), 2);

	let closure = link_closure(&[nir.clone()], &[compiler.clone()]);
	assert_eq!(closure.whole_static_libs, vec!["compiler".to_owned()]);
	assert_eq!(closure.static_libs, vec!["nir".to_owned(), "util".to_owned()]);

	assert_eq!(link_closure(&[], &[]), LinkClosure::default());
}
