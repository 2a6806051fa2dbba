use std::io::{ self, Write };
use std::sync::Arc ;
use std::sync::atomic::{ AtomicBool, Ordering };
use addin_loader::console ;
use crate::capture::{ capture_console, Capture };

/// Sink whose flush always fails.
struct BrokenPipe( Arc<AtomicBool> );

impl Write for BrokenPipe {
	fn write( &mut self, buf: &[u8] ) -> io::Result<usize> { Ok( buf.len() ) }
	fn flush( &mut self ) -> io::Result<()> {
		self.0.store( true, Ordering::SeqCst );
		Err( io::Error::new( io::ErrorKind::BrokenPipe, "reader went away" ))
	}
}

#[test]
fn console_test_failing_flush() {

	let ( capture, _guard ) = capture_console();
	let flushed = Arc::new( AtomicBool::new( false ));
	let previous = console::redirect_stdout( Box::new( BrokenPipe( Arc::clone( &flushed ))));

	let logs = Capture::default();
	let subscriber = tracing_subscriber::fmt()
		.with_writer({ let logs = logs.clone(); move || logs.clone() })
		.with_ansi( false )
		.finish();
	tracing::subscriber::with_default( subscriber, || console::restore_stdout( previous ));

	assert!( flushed.load( Ordering::SeqCst ));
	assert!( logs.contents().contains( "Failed to flush redirected console output: reader went away" ), "{}", logs.contents() );

	// The previous destination is back regardless.
	writeln!( console::stdout(), "restored" ).unwrap();
	assert_eq!( capture.contents(), "restored\n" );

}
