use std::io::Write ;
use std::sync::Arc ;
use addin_loader::{ BootstrapError, Loader, RegistryError, console };
use crate::capture::capture_console ;
use crate::test_plugin::{ isolated_state, TestPlugin };
use super::failing_registry::FailingRegistry ;

#[test]
fn console_test_restored_after_failure() {

	let ( capture, _guard ) = capture_console();
	let state = isolated_state();

	let result = Loader::<TestPlugin>::builder( Arc::new( FailingRegistry::default() ))
		.registry_state( state )
		.keep_registry_cache()
		.build();

	match result {
		Err( BootstrapError::Registry( RegistryError::Gateway( err ))) => assert_eq!( err.to_string(), "registry database is locked" ),
		Err( err ) => panic!( "Expected a gateway error, got: {}", err ),
		Ok( _ ) => panic!( "Expected the bootstrap to fail" ),
	}

	assert!( !state.is_initialized() );
	assert!( !console::is_suppressed() );
	assert_eq!( capture.contents(), "" );

	writeln!( console::stdout(), "still here" ).unwrap();
	assert_eq!( capture.contents(), "still here\n" );

}
