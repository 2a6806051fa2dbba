use addin_loader::{ CountConstraint, LoadError };
use crate::test_plugin::{ journal, loaded_ids };

fixtures! {
	"/app/core" => [ "scheduler", "clock" ],
	"/app/database" => [],
	"/app/modules" => [ "terrain" ],
}

#[test]
fn loading_test_partial_success_kept() {

	let journal = journal();
	let mut loader = fixtures::loader( &journal );

	loader.add_extension_point( "/app/core" );
	loader.add_extension_point( "/app/database" );
	loader.add_extension_point( "/app/modules" );
	loader.add_constraint( "/app/database", CountConstraint::exactly( 1 )).unwrap();

	assert!( matches!( loader.load(), Err( LoadError::Constraint( _ ))));

	// Earlier points stay loaded, later ones were never reached.
	assert_eq!( loaded_ids( &loader ), [ "scheduler", "clock" ]);

}
