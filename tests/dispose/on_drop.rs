use crate::test_plugin::{ entries, journal };

fixtures! {
	"/app/modules" => [ "terrain", "faulty-water" ],
}

#[test]
fn dispose_test_on_drop() {

	let journal = journal();
	{
		let mut loader = fixtures::loader( &journal );
		loader.load_extension_point( "/app/modules" ).unwrap();
	}

	// Failures while dropping are logged, not raised.
	assert_eq!( entries( &journal ), [
		"create:terrain", "create:faulty-water",
		"dispose:terrain", "dispose:faulty-water",
	]);

}
