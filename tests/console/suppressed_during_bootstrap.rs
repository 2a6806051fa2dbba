use std::io::Write ;
use std::sync::Arc ;
use addin_loader::{ Loader, MemoryRegistry, console };
use crate::capture::capture_console ;
use crate::test_plugin::{ isolated_state, TestPlugin };

#[test]
fn console_test_suppressed_during_bootstrap() {

	let ( capture, _guard ) = capture_console();

	Loader::<TestPlugin>::builder( Arc::new( MemoryRegistry::new()))
		.registry_state( isolated_state() )
		.keep_registry_cache()
		.build()
		.unwrap();

	assert_eq!( capture.contents(), "" );
	assert!( !console::is_suppressed() );

	writeln!( console::stdout(), "host output" ).unwrap();
	assert_eq!( capture.contents(), "host output\n" );

	// With suppression disabled the registry's chatter comes through.
	Loader::<TestPlugin>::builder( Arc::new( MemoryRegistry::new()))
		.registry_state( isolated_state() )
		.keep_registry_cache()
		.suppress_output( false )
		.root_dir( "registry-root" )
		.build()
		.unwrap();

	assert!( capture.contents().contains( "Initializing in-memory registry at registry-root" ));
	assert!( capture.contents().contains( "Publishing 0 staged registrations" ));

}
