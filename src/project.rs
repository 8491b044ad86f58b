/// Project-wide settings declared by `project()` and `add_project_arguments()`.
#[derive(Debug, Default)]
pub struct ProjectInfo {
	pub name: String,
	pub version: String,
	pub c_std: Option<String>,
	pub cpp_std: Option<String>,
	pub c_args: Vec<String>,
	pub cpp_args: Vec<String>,
}

impl ProjectInfo {
	/// Picks the language standards out of `key=value` default options; other options are
	/// settings of the upstream build and are ignored.
	pub fn new(name: &str, version: &str, default_options: &[String]) -> ProjectInfo {
		let mut info = ProjectInfo { name: name.to_owned(), version: version.to_owned(), ..Default::default() };
		for option in default_options {
			match option.split_once('=') {
				Some(("c_std", value)) => info.c_std = Some(value.trim().to_owned()),
				Some(("cpp_std", value)) => info.cpp_std = Some(value.trim().to_owned()),
				_ => log::debug!("Ignoring default option \"{}\"", option),
			}
		}
		info
	}

	pub fn add_arguments(&mut self, args: &[String], languages: &[String]) -> Result<(), String> {
		for language in languages {
			let target = match language.as_str() {
				"c" => &mut self.c_args,
				"cpp" => &mut self.cpp_args,
				_ => return Err(format!("Unsupported language for project arguments: \"{}\"", language)),
			};
			target.extend(args.iter().cloned());
		}
		Ok(())
	}
}

#[test]
fn test_project_info() {
	let options = vec!["buildtype=debugoptimized".to_owned(), "c_std=c11".to_owned(), "cpp_std=c++17".to_owned()];
	let mut info = ProjectInfo::new("mesa", "24.2.0", &options);
	assert_eq!(info.c_std.as_deref(), Some("c11"));
	assert_eq!(info.cpp_std.as_deref(), Some("c++17"));

	info.add_arguments(&["-DHAVE_PTHREAD".to_owned()], &["c".to_owned(), "cpp".to_owned()]).unwrap();
	info.add_arguments(&["-fno-exceptions".to_owned()], &["cpp".to_owned()]).unwrap();
	assert_eq!(info.c_args, vec!["-DHAVE_PTHREAD"]);
	assert_eq!(info.cpp_args, vec!["-DHAVE_PTHREAD", "-fno-exceptions"]);
	assert!(info.add_arguments(&[], &["rust".to_owned()]).is_err());
}
