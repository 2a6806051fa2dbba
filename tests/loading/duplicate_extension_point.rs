use crate::test_plugin::{ journal, loaded_ids };

fixtures! {
	"/app/modules" => [ "terrain", "water" ],
}

#[test]
fn loading_test_duplicate_extension_point() {

	let journal = journal();
	let mut loader = fixtures::loader( &journal );

	loader.add_extension_point( "/app/modules" );
	loader.add_extension_point( "/app/modules" );
	assert_eq!( loader.extension_points(), [ "/app/modules", "/app/modules" ]);

	loader.load().unwrap();
	assert_eq!( loaded_ids( &loader ), [ "terrain", "water", "terrain", "water" ]);

}
