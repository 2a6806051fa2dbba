use addin_loader::{ FactoryNode, LoadError };
use crate::test_plugin::{ journal, loader, loaded_ids, TestPlugin };

#[test]
fn loading_test_type_mismatch() {

	let journal = journal();
	let registry = std::sync::Arc::new( addin_loader::MemoryRegistry::new());
	registry.register( "/app/modules", TestPlugin::node( "terrain", &journal ));
	registry.register( "/app/modules", FactoryNode::new( "impostor", || "not a plugin".to_string() ).with_path( "/app/modules/impostor" ));
	registry.register( "/app/modules", TestPlugin::node( "water", &journal ));

	let mut loader = loader( registry );
	match loader.load_extension_point( "/app/modules" ) {
		Err( LoadError::TypeMismatch { path, expected }) => {
			assert_eq!( path, "/app/modules/impostor" );
			assert!( expected.ends_with( "TestPlugin" ), "unexpected type name {}", expected );
		},
		Err( err ) => panic!( "Expected TypeMismatch, got: {}", err ),
		Ok(()) => panic!( "Expected TypeMismatch" ),
	}

	assert_eq!( loaded_ids( &loader ), [ "terrain" ]);

}
