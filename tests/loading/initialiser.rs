use addin_loader::{ BoxError, Loader };
use crate::test_plugin::{ entries, isolated_state, journal, TestPlugin };

fixtures! {
	"/app/modules" => [ "terrain", "water" ],
}

fn start( plugin: &mut TestPlugin ) -> Result<(), BoxError> {
	plugin.record( "init" );
	plugin.initialised = true ;
	Ok(())
}

#[test]
fn loading_test_initialiser() {

	let journal = journal();

	let mut loader = Loader::<TestPlugin>::with_initialiser_in( fixtures::registry( &journal ), start, "." ).unwrap();
	loader.load_extension_point( "/app/modules" ).unwrap();

	assert!( loader.plugins().iter().all(| plugin | plugin.initialised ));
	assert_eq!( entries( &journal ), [ "create:terrain", "init:terrain", "create:water", "init:water" ]);

	// Swapping the initialiser only affects later passes.
	let mut loader = Loader::<TestPlugin>::builder( fixtures::registry( &journal ))
		.registry_state( isolated_state() )
		.keep_registry_cache()
		.initialiser( start )
		.build()
		.unwrap();
	loader.set_initialiser( addin_loader::NoopInitialiser );
	loader.load_extension_point( "/app/modules" ).unwrap();
	assert!( loader.plugins().iter().all(| plugin | !plugin.initialised ));

}
