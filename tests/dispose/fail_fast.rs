use addin_loader::DisposeError ;
use crate::test_plugin::{ entries, journal, loaded_ids };

fixtures! {
	"/app/modules" => [ "terrain", "faulty-water", "wind" ],
}

#[test]
fn dispose_test_fail_fast() {

	let journal = journal();
	let mut loader = fixtures::loader( &journal );
	loader.load_extension_point( "/app/modules" ).unwrap();

	match loader.dispose() {
		Err( DisposeError { index: 1, source }) => assert_eq!( source.to_string(), "faulty-water refused to shut down" ),
		Err( err ) => panic!( "Expected the second plugin to fail, got: {}", err ),
		Ok(()) => panic!( "Expected a dispose failure" ),
	}

	// Plugins are torn down, not removed.
	assert_eq!( loaded_ids( &loader ), [ "terrain", "faulty-water", "wind" ]);

	// No second attempt, neither explicitly nor on drop.
	loader.dispose().unwrap();
	drop( loader );
	assert_eq!( entries( &journal ).iter().filter(| entry | entry.starts_with( "dispose" )).collect::<Vec<_>>(), [
		"dispose:terrain", "dispose:faulty-water",
	]);

}
