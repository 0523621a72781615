use anyhow::Result;
use pretty_assertions::assert_eq;
use tinytree::error::FormatError;
use tinytree::tree::Mapped;
use tinytree::LoadOptions;

#[test]
fn legacy_file() -> Result<()> {
	let mappings = tinytree::tiny_v1::read(include_str!("input/legacy.tiny").as_bytes())?;

	mappings.metadata().namespaces.check_that(&["official", "intermediary", "named"])?;
	assert_eq!((mappings.metadata().major_version, mappings.metadata().minor_version), (1, 0));

	let named = mappings.get_namespace("named")?;

	let widget = &mappings.classes()["a"];
	assert_eq!(widget.get_name(named), "com/example/Widget");
	assert_eq!(widget.fields[0].get_name(named), "size");
	assert_eq!(mappings.get_desc(&widget.methods[0], named), "(Lcom/example/Widget;I)Lcom/example/Widget;");

	// a method of a class without a CLASS line
	let undeclared = &mappings.classes()["c"];
	assert_eq!(undeclared.names.raw_names(), ["c"]);
	assert_eq!(undeclared.get_name(named), "c");
	assert_eq!(undeclared.methods[0].get_name(named), "method_3");
	Ok(())
}

#[test]
fn detection() -> Result<()> {
	let legacy = tinytree::read_with_detection(include_str!("input/legacy.tiny").as_bytes())?;
	assert_eq!(legacy.metadata().major_version, 1);
	assert_eq!(legacy.classes().len(), 2);

	let modern = tinytree::read_with_detection_with(include_str!("input/basic.tiny").as_bytes(), LoadOptions::slim())?;
	assert_eq!(modern.metadata().major_version, 2);
	assert!(modern.classes()["a"].methods[0].parameters.is_empty());

	let err = tinytree::read_with_detection("v3\ta\tb\n".as_bytes()).unwrap_err();
	assert_eq!(err.downcast_ref::<FormatError>(), Some(&FormatError::UnsupportedFormat("v3\ta\tb".to_owned())));
	Ok(())
}

#[test]
fn same_tree_as_v2() -> Result<()> {
	let v1 = tinytree::tiny_v1::read("v1\ta\tb\nCLASS\tx\tX\nFIELD\tx\tLx;\tf\tF\nMETHOD\tx\t()Lx;\tm\tM\n".as_bytes())?;
	let v2 = tinytree::tiny_v2::read("tiny\t2\t0\ta\tb\nc\tx\tX\n\tf\tLx;\tf\tF\n\tm\t()Lx;\tm\tM\n".as_bytes())?;

	assert_eq!(v1.metadata().namespaces, v2.metadata().namespaces);
	assert_eq!(v1.classes(), v2.classes());
	Ok(())
}
