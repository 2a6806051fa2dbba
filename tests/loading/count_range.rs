use addin_loader::{ Constraint, CountConstraint, LoadError };
use crate::test_plugin::{ journal, loaded_ids };

fixtures! {
	"/app/renderers" => [ "gl", "vk", "metal" ],
}

#[test]
fn loading_test_count_range() {

	let journal = journal();

	let mut loader = fixtures::loader( &journal );
	loader.add_constraint( "/app/renderers", CountConstraint::between( 2, 3 )).unwrap();
	loader.load_extension_point( "/app/renderers" ).unwrap();
	assert_eq!( loaded_ids( &loader ), [ "gl", "vk", "metal" ]);

	let mut loader = fixtures::loader( &journal );
	loader.add_constraint( "/app/renderers", CountConstraint::at_most( 2 )).unwrap();
	assert!( matches!( loader.load_extension_point( "/app/renderers" ), Err( LoadError::Constraint( _ ))));

	let mut loader = fixtures::loader( &journal );
	loader.add_constraint( "/app/renderers", CountConstraint::at_least( 1 )).unwrap();
	loader.load_extension_point( "/app/renderers" ).unwrap();
	assert_eq!( loader.plugins().len(), 3 );

	assert_eq!( CountConstraint::at_least( 4 ).message(), format!( "The number of plugins is constrained to the interval [4, {}]", usize::MAX ));
	assert!( !CountConstraint::between( 3, 2 ).admits( 2 ));

}
