//! The process console used by registry gateways.
//!
//! Registries can be noisy while they scan. Their output goes through
//! [`stdout`], which writes to the real standard output unless a sink has been
//! installed with [`redirect_stdout`].
//!
//! [`OutputSuppression`] silences both the console and the process's real
//! standard output for as long as it lives, so gateways that `println!` are
//! quiet too, and gives them back in its `Drop`.

use std::io::{ self, Write };
use std::sync::{ Mutex, MutexGuard, PoisonError };
use gag::Gag ;
use tracing::warn ;



type Sink = Box<dyn Write + Send> ;

struct Console {
	redirect: Option<Sink>,
	suppressed: usize,
	gag: Option<Gag>,
}

static CONSOLE: Mutex<Console> = Mutex::new( Console { redirect: None, suppressed: 0, gag: None });

fn lock_console() -> MutexGuard<'static, Console> {
	CONSOLE.lock().unwrap_or_else( PoisonError::into_inner )
}

/// Handle onto the process console, see [`stdout`].
#[derive( Debug, Clone, Copy, Default )]
pub struct Stdout ;

/// Returns a writer onto the current console destination.
///
/// The destination is resolved on every write, so a handle obtained before a
/// redirection follows it.
pub fn stdout() -> Stdout { Stdout }

impl Write for Stdout {

	fn write( &mut self, buf: &[u8] ) -> io::Result<usize> {
		let mut console = lock_console();
		match ( console.suppressed, console.redirect.as_mut() ) {
			( 1.., _ ) => Ok( buf.len() ),
			( 0, Some( sink )) => sink.write( buf ),
			( 0, None ) => io::stdout().write( buf ),
		}
	}

	fn flush( &mut self ) -> io::Result<()> {
		match lock_console().redirect.as_mut() {
			Some( sink ) => sink.flush(),
			None => io::stdout().flush(),
		}
	}

}

/// Installs `sink` as the console destination and returns the redirection it replaced.
///
/// `None` in the return value means the console was writing to the real standard output.
pub fn redirect_stdout( sink: Box<dyn Write + Send> ) -> Option<Box<dyn Write + Send>> {
	lock_console().redirect.replace( sink )
}

/// Reinstates a destination previously returned by [`redirect_stdout`].
pub fn restore_stdout( previous: Option<Box<dyn Write + Send>> ) {
	let mut console = lock_console();
	if let Some( sink ) = console.redirect.as_mut() {
		if let Err( err ) = sink.flush() { warn!( "Failed to flush redirected console output: {}", err ); }
	}
	console.redirect = previous ;
}

/// Whether an [`OutputSuppression`] guard is currently alive.
pub fn is_suppressed() -> bool { lock_console().suppressed > 0 }

/// Scoped console suppression.
///
/// While any guard is alive everything written through [`stdout`] is discarded
/// and the process's standard output file descriptor points at the null device.
/// Guards nest and may be held on several threads at once; output comes back
/// when the last one is dropped, whichever way its scope is left.
///
/// If standard output cannot be redirected, for instance because something else
/// already holds a redirection of it, a warning is logged and only [`stdout`] is
/// silenced.
///
/// ```
/// use std::io::Write ;
/// use addin_loader::console::{ self, OutputSuppression };
///
/// {
///     let _quiet = OutputSuppression::acquire();
///     assert!( console::is_suppressed() );
///     writeln!( console::stdout(), "never shown" ).unwrap();
///     println!( "not shown either" );
/// }
/// assert!( !console::is_suppressed() );
/// writeln!( console::stdout(), "shown again" ).unwrap();
/// ```
#[must_use = "output is restored as soon as the guard is dropped"]
pub struct OutputSuppression {
	_private: (),
}

impl OutputSuppression {
	pub fn acquire() -> Self {
		let mut console = lock_console();
		if console.suppressed == 0 { console.gag = gag_process_stdout(); }
		console.suppressed += 1 ;
		Self { _private: () }
	}
}

impl Drop for OutputSuppression {
	fn drop( &mut self ) {
		let mut console = lock_console();
		console.suppressed = console.suppressed.saturating_sub( 1 );
		if console.suppressed == 0 {
			if let Some( gag ) = console.gag.take() {
				// Lines still buffered by std belong to the silenced scope.
				flush_process_stdout();
				drop( gag );
			}
		}
	}
}

fn gag_process_stdout() -> Option<Gag> {
	flush_process_stdout();
	Gag::stdout()
		.map_err(| err | warn!( "Failed to silence standard output, registry output will show: {}", err ))
		.ok()
}

fn flush_process_stdout() {
	if let Err( err ) = io::stdout().flush() { warn!( "Failed to flush standard output: {}", err ); }
}

impl std::fmt::Debug for OutputSuppression {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "OutputSuppression" ).finish_non_exhaustive()
	}
}
