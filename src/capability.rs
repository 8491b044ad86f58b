use std::sync::Arc;

use crate::config::ProjectConfig;

/// Answers the compiler capability checks a build description makes.
pub trait CapabilityOracle {
	fn has_header(&self, header: &str) -> bool;
	fn has_header_symbol(&self, header: &str, symbol: &str) -> bool;
	fn has_function(&self, function: &str) -> bool;
	fn links(&self, name: &str) -> bool;
}

/// Assumes the hermetic toolchain supports everything.
#[derive(Debug, Default)]
pub struct AllSupported;

impl CapabilityOracle for AllSupported {
	fn has_header(&self, _header: &str) -> bool {
		true
	}
	fn has_header_symbol(&self, _header: &str, _symbol: &str) -> bool {
		true
	}
	fn has_function(&self, _function: &str) -> bool {
		true
	}
	fn links(&self, _name: &str) -> bool {
		true
	}
}

/// Reports anything the project config lists as unsupported as missing, and asks `inner`
/// about everything else.
#[derive(Debug)]
pub struct FilteredOracle<O> {
	inner: O,
	headers: Vec<String>,
	symbols: Vec<String>,
	functions: Vec<String>,
	links: Vec<String>,
}

impl<O: CapabilityOracle> FilteredOracle<O> {
	pub fn new(config: &ProjectConfig, inner: O) -> FilteredOracle<O> {
		FilteredOracle {
			inner,
			headers: config.header_not_supported.headers.clone(),
			symbols: config.symbol_not_supported.symbols.clone(),
			functions: config.function_not_supported.functions.clone(),
			links: config.link_not_supported.links.clone(),
		}
	}
}

impl<O: CapabilityOracle> CapabilityOracle for FilteredOracle<O> {
	fn has_header(&self, header: &str) -> bool {
		let result = !self.headers.iter().any(|x| x == header) && self.inner.has_header(header);
		log::info!("check_header '{}': {}", header, result);
		result
	}

	fn has_header_symbol(&self, header: &str, symbol: &str) -> bool {
		let result = !self.headers.iter().any(|x| x == header)
			&& !self.symbols.iter().any(|x| x == symbol)
			&& self.inner.has_header_symbol(header, symbol);
		log::info!("has_header_symbol '{}', '{}': {}", header, symbol, result);
		result
	}

	fn has_function(&self, function: &str) -> bool {
		let result = !self.functions.iter().any(|x| x == function) && self.inner.has_function(function);
		log::info!("has_function '{}': {}", function, result);
		result
	}

	fn links(&self, name: &str) -> bool {
		let result = !self.links.iter().any(|x| x == name) && self.inner.links(name);
		log::info!("links '{}': {}", name, result);
		result
	}
}

/// The compiler handle a build description queries. Every language shares one filter.
#[derive(Clone, Debug)]
pub struct Compiler {
	pub language: String,
	pub(crate) oracle: Arc<FilteredOracle<AllSupported>>,
}

impl Compiler {
	pub fn id(&self) -> &'static str {
		"clang"
	}

	pub fn has_header(&self, header: &str) -> bool {
		self.oracle.has_header(header)
	}

	pub fn has_header_symbol(&self, header: &str, symbol: &str) -> bool {
		self.oracle.has_header_symbol(header, symbol)
	}

	pub fn has_function(&self, function: &str) -> bool {
		self.oracle.has_function(function)
	}

	pub fn links(&self, name: &str) -> bool {
		self.oracle.links(name)
	}
}

#[test]
fn test_filtered_oracle() {
	let mut config = crate::config::test_config("android");
	config.header_not_supported.headers = vec!["xlocale.h".to_owned()];
	config.symbol_not_supported.symbols = vec!["reallocarray".to_owned()];
	config.function_not_supported.functions = vec!["qsort_s".to_owned()];
	config.link_not_supported.links = vec!["sse41".to_owned()];
	let oracle = FilteredOracle::new(&config, AllSupported);

	assert!(!oracle.has_header("xlocale.h"));
	assert!(oracle.has_header("stdlib.h"));
	assert!(!oracle.has_header_symbol("xlocale.h", "newlocale"));
	assert!(!oracle.has_header_symbol("stdlib.h", "reallocarray"));
	assert!(oracle.has_header_symbol("stdlib.h", "qsort"));
	assert!(!oracle.has_function("qsort_s"));
	assert!(oracle.has_function("qsort_r"));
	assert!(!oracle.links("sse41"));
	assert!(oracle.links("dl_iterate_phdr"));
}
