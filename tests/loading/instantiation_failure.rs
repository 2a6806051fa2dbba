use addin_loader::{ FactoryNode, LoadError };
use crate::test_plugin::{ journal, loader, TestPlugin };

#[test]
fn loading_test_instantiation_failure() {

	let journal = journal();
	let registry = std::sync::Arc::new( addin_loader::MemoryRegistry::new());
	registry.register( "/app/modules", FactoryNode::fallible( "broken", || Err( "missing assembly".into() )));
	registry.register( "/app/modules", TestPlugin::node( "terrain", &journal ));

	let mut loader = loader( registry );
	match loader.load_extension_point( "/app/modules" ) {
		Err( LoadError::Instantiate { path, source }) => {
			assert_eq!( path, "broken" );
			assert_eq!( source.to_string(), "missing assembly" );
		},
		Err( err ) => panic!( "Expected Instantiate, got: {}", err ),
		Ok(()) => panic!( "Expected Instantiate" ),
	}

	assert!( loader.plugins().is_empty() );

}
