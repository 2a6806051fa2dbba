#[allow( dead_code )]
mod manifests {

	use std::path::Path ;
	use std::sync::{ Arc, Mutex };
	use addin_loader::{ BoxError, CandidateNode, ManifestNode, ManifestRegistry, RegistryGateway };
	use crate::test_plugin::{ Journal, TestPlugin };

	/// Writes `contents` to `root/relative`, creating directories on the way.
	pub fn write_manifest( root: &Path, relative: &str, contents: &str ) {
		let path = root.join( relative );
		if let Some( parent ) = path.parent() { std::fs::create_dir_all( parent ).unwrap(); }
		std::fs::write( path, contents ).unwrap();
	}

	/// Registry that builds [`TestPlugin`]s for nodes of type `test`.
	pub fn registry( journal: &Journal ) -> ManifestRegistry {
		let journal = Arc::clone( journal );
		ManifestRegistry::new().with_factory( "test", move | node: &ManifestNode | -> Result<Box<dyn std::any::Any>, BoxError> {
			Ok( Box::new( TestPlugin::new( node.id(), &journal )))
		})
	}

	/// Load errors the registry reports, rendered as `message: error`.
	pub fn collect_errors( registry: &dyn RegistryGateway ) -> Arc<Mutex<Vec<String>>> {
		let errors = Arc::new( Mutex::new( Vec::new() ));
		let sink = Arc::clone( &errors );
		registry.on_load_error( Box::new( move | message: &str, err: &( dyn std::error::Error + 'static )| {
			sink.lock().unwrap().push( format!( "{}: {}", message, err ));
		}));
		errors
	}

	pub fn candidate_ids( registry: &dyn RegistryGateway, extension_point: &str ) -> Vec<String> {
		registry.enumerate_candidates( extension_point ).unwrap()
			.iter()
			.map(| node | node.id().to_string() )
			.collect()
	}

}
