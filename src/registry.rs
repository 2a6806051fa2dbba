//! The boundary to the extension registry.
//!
//! The registry owns manifest parsing, candidate enumeration and its on-disk
//! cache. The loader only consumes it through [`RegistryGateway`], so hosts can
//! plug in whatever registry they run. Two gateways ship with the crate:
//! [`MemoryRegistry`]( crate::MemoryRegistry ) and
//! [`ManifestRegistry`]( crate::ManifestRegistry ).

use std::any::Any ;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex, PoisonError };
use itertools::Itertools ;
use thiserror::Error ;

use crate::BoxError ;



/// Handler invoked with the id of every addin the registry loads.
pub type LoadedHandler = Box<dyn Fn( &str ) + Send + Sync> ;

/// Handler invoked with a message and the underlying error when the registry
/// fails to load an addin.
pub type LoadErrorHandler = Box<dyn Fn( &str, &( dyn std::error::Error + 'static )) + Send + Sync> ;

/// Errors raised by a registry gateway.
#[derive( Debug, Error )]
pub enum RegistryError {
    /// The registry was queried before [`RegistryGateway::initialize`] succeeded.
    #[error( "Registry not initialized" )] NotInitialized,
    /// The root directory handed to [`RegistryGateway::initialize`] does not exist.
    #[error( "Registry root is not a directory: {}", .0.display() )] MissingRoot( PathBuf ),
    /// Reading from the registry's storage failed.
    #[error( "Io error at {}: {source}", path.display() )]
    Io { path: PathBuf, #[source] source: std::io::Error },
    /// Failure reported by a host-provided gateway.
    #[error( "Registry error: {0}" )] Gateway( BoxError ),
}

/// A discovered, not yet instantiated plugin entry belonging to one extension point.
///
/// Nodes are owned by the registry; the loader only reads them.
pub trait CandidateNode: Send + Sync {

    /// Identifier of the node, as matched by [`IdFilter`]( crate::IdFilter ).
    fn id( &self ) -> &str ;

    /// Human readable location of the node, used in diagnostics.
    fn path( &self ) -> &str { self.id() }

    /// Produces a fresh plugin instance.
    ///
    /// The loader downcasts the returned value into its plugin type, so the
    /// concrete type inside the box must be exactly that type.
    ///
    /// # Errors
    /// Any failure constructing the instance.
    fn create_instance( &self ) -> Result<Box<dyn Any>, BoxError> ;

}

impl std::fmt::Debug for dyn CandidateNode {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "CandidateNode" )
            .field( "id", &self.id() )
            .field( "path", &self.path() )
            .finish_non_exhaustive()
    }
}

/// The extension registry as seen by the loader.
///
/// Implementations are shared between loaders, so every method takes `&self`.
pub trait RegistryGateway: Send + Sync {

    /// Whether [`initialize`]( Self::initialize ) has already succeeded.
    fn is_initialized( &self ) -> bool ;

    /// Initializes the registry rooted at `root_directory`.
    ///
    /// # Errors
    /// Implementation specific; the bootstrap aborts on any error.
    fn initialize( &self, root_directory: &Path ) -> Result<(), RegistryError> ;

    /// Rescans the registry's contents.
    ///
    /// # Errors
    /// Implementation specific. Failures of individual addins should be reported
    /// through the [`on_load_error`]( Self::on_load_error ) handlers instead.
    fn refresh_registry( &self ) -> Result<(), RegistryError> ;

    /// Enumerates the candidates registered under `extension_point`, in registry order.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotInitialized`] when queried too early, or any
    /// implementation specific failure.
    fn enumerate_candidates( &self, extension_point: &str ) -> Result<Vec<Arc<dyn CandidateNode>>, RegistryError> ;

    /// Number of candidates currently registered under `extension_point`.
    ///
    /// # Errors
    /// Same as [`enumerate_candidates`]( Self::enumerate_candidates ).
    fn candidate_count( &self, extension_point: &str ) -> Result<usize, RegistryError> {
        Ok( self.enumerate_candidates( extension_point )?.len() )
    }

    /// Subscribes to successful addin loads.
    fn on_loaded( &self, handler: LoadedHandler );

    /// Subscribes to addin load failures.
    fn on_load_error( &self, handler: LoadErrorHandler );

}

/// Subscriber lists for the two registry notifications.
///
/// Gateway implementations embed one of these and call the `emit_*` methods
/// once their own locks are released, so handlers may call back into the registry.
#[derive( Default )]
pub struct RegistryEvents {
    loaded: Mutex<Vec<Arc<dyn Fn( &str ) + Send + Sync>>>,
    load_error: Mutex<Vec<Arc<dyn Fn( &str, &( dyn std::error::Error + 'static )) + Send + Sync>>>,
}

impl RegistryEvents {

    pub fn new() -> Self { Self::default() }

    pub fn subscribe_loaded( &self, handler: LoadedHandler ) {
        self.loaded.lock().unwrap_or_else( PoisonError::into_inner ).push( Arc::from( handler ));
    }

    pub fn subscribe_load_error( &self, handler: LoadErrorHandler ) {
        self.load_error.lock().unwrap_or_else( PoisonError::into_inner ).push( Arc::from( handler ));
    }

    pub fn emit_loaded( &self, addin_id: &str ) {
        let handlers = self.loaded.lock().unwrap_or_else( PoisonError::into_inner ).clone();
        handlers.iter().for_each(| handler | handler( addin_id ));
    }

    pub fn emit_load_error( &self, message: &str, error: &( dyn std::error::Error + 'static )) {
        let handlers = self.load_error.lock().unwrap_or_else( PoisonError::into_inner ).clone();
        handlers.iter().for_each(| handler | handler( message, error ));
    }

}

impl std::fmt::Debug for RegistryEvents {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "RegistryEvents" )
            .field( "loaded", &self.loaded.lock().map_or( 0, | handlers | handlers.len() ))
            .field( "load_error", &self.load_error.lock().map_or( 0, | handlers | handlers.len() ))
            .finish()
    }
}

/// Renders an error together with its whole `source()` chain.
pub(crate) fn error_chain( error: &( dyn std::error::Error + 'static )) -> String {
    std::iter::successors( Some( error ), | err | err.source() ).join( ": " )
}
