use std::io::Write ;
use std::path::Path ;
use std::sync::Arc ;
use addin_loader::{ CandidateNode, LoadErrorHandler, LoadedHandler, RegistryError, RegistryGateway, console };

/// Gateway that talks on the console and then fails to initialise, or panics.
#[derive( Debug, Default )]
pub struct FailingRegistry {
	pub panics: bool,
}

impl RegistryGateway for FailingRegistry {

	fn is_initialized( &self ) -> bool { false }

	fn initialize( &self, root_directory: &Path ) -> Result<(), RegistryError> {
		writeln!( console::stdout(), "Opening registry at {}", root_directory.display() ).unwrap();
		match self.panics {
			true => panic!( "registry database is corrupt" ),
			false => Err( RegistryError::Gateway( "registry database is locked".into() )),
		}
	}

	fn refresh_registry( &self ) -> Result<(), RegistryError> { Ok(()) }

	fn enumerate_candidates( &self, _: &str ) -> Result<Vec<Arc<dyn CandidateNode>>, RegistryError> {
		Err( RegistryError::NotInitialized )
	}

	fn on_loaded( &self, _: LoadedHandler ) {}

	fn on_load_error( &self, _: LoadErrorHandler ) {}

}
