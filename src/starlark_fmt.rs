/// Renders `items` as the body of a list inside a wrapper's `Display` output. Lists with more than
/// one entry go one per line.
pub(crate) fn format_strings<S: AsRef<str>>(items: &[S]) -> String {
	let mut ret = items
		.iter()
		.map(|x| format!("\"{}\"", x.as_ref()))
		.collect::<Vec<_>>()
		.join(",\n    ");
	if items.len() > 1 {
		ret = String::from("\n    ") + &ret + ",\n  ";
	}
	ret
}

#[test]
fn test_format_strings() {
	assert_eq!(format_strings::<&str>(&[]), "");
	assert_eq!(format_strings(&["gen.h"]), "\"gen.h\"");
	assert_eq!(format_strings(&["gen.h", "gen.c"]), "\n    \"gen.h\",\n    \"gen.c\",\n  ");
}
