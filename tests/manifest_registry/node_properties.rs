use std::sync::{ Arc, Mutex };
use addin_loader::{ BoxError, CandidateNode, ManifestNode, ManifestRegistry, RegistryGateway };
use crate::manifests::write_manifest ;

#[test]
fn manifest_registry_test_node_properties() {

	let root = tempfile::tempdir().unwrap();
	write_manifest( root.path(), "terrain.addin.toml", r#"
		id = "terrain-pack"

		[[node]]
		extension_point = "/app/modules"
		id = "terrain"
		type = "sized"
		properties = { size = "256", seed = "7" }
	"# );

	let seen = Arc::new( Mutex::new( Vec::new() ));
	let sink = Arc::clone( &seen );
	let registry = ManifestRegistry::new().with_factory( "sized", move | node: &ManifestNode | -> Result<Box<dyn std::any::Any>, BoxError> {
		sink.lock().unwrap().push(( node.addin_id().to_string(), node.extension_point().to_string(), node.type_name().to_string() ));
		let size = node.property( "size" ).ok_or( "size is required" )?.parse::<u32>()?;
		Ok( Box::new( size ))
	});
	registry.initialize( root.path() ).unwrap();
	registry.refresh_registry().unwrap();

	let nodes = registry.enumerate_candidates( "/app/modules" ).unwrap();
	let instance = nodes[ 0 ].create_instance().unwrap();
	assert_eq!( instance.downcast_ref::<u32>(), Some( &256 ));
	assert_eq!( *seen.lock().unwrap(), [( "terrain-pack".to_string(), "/app/modules".to_string(), "sized".to_string() )]);
	assert!( format!( "{:?}", nodes[ 0 ] ).contains( "/app/modules/terrain" ));

}
