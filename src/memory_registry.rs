//! An in-process registry gateway.
//!
//! Hosts that compile their plugins in register them as [`FactoryNode`]s.
//! Registrations are staged until the next [`refresh_registry`]( RegistryGateway::refresh_registry ),
//! which publishes them and fires the load notifications, just as a
//! directory-backed registry would after a rescan.

use std::any::Any ;
use std::collections::HashMap ;
use std::io::Write ;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use thiserror::Error ;

use crate::BoxError ;
use crate::console ;
use crate::registry::{ CandidateNode, LoadErrorHandler, LoadedHandler, RegistryError, RegistryEvents, RegistryGateway };



type Factory = Box<dyn Fn() -> Result<Box<dyn Any>, BoxError> + Send + Sync> ;

/// A candidate that produces instances from a closure.
pub struct FactoryNode {
    id: String,
    path: String,
    factory: Factory,
}

impl FactoryNode {

    /// Node whose instances are the values returned by `factory`.
    pub fn new<T: Any>( id: impl Into<String>, factory: impl Fn() -> T + Send + Sync + 'static ) -> Self {
        Self::fallible( id, move || Ok( Box::new( factory()) as Box<dyn Any> ))
    }

    /// Node whose factory may fail or return any type.
    pub fn fallible(
        id: impl Into<String>,
        factory: impl Fn() -> Result<Box<dyn Any>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let id = id.into();
        Self { path: id.clone(), id, factory: Box::new( factory ) }
    }

    /// Overrides the diagnostic path, which defaults to the id.
    pub fn with_path( mut self, path: impl Into<String> ) -> Self {
        self.path = path.into();
        self
    }

}

impl CandidateNode for FactoryNode {
    fn id( &self ) -> &str { &self.id }
    fn path( &self ) -> &str { &self.path }
    fn create_instance( &self ) -> Result<Box<dyn Any>, BoxError> { ( self.factory )() }
}

impl std::fmt::Debug for FactoryNode {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "FactoryNode" )
            .field( "id", &self.id )
            .field( "path", &self.path )
            .field( "factory", &"<closure>" )
            .finish()
    }
}

/// Load failure staged with [`MemoryRegistry::register_failure`].
#[derive( Debug, Error )]
#[error( "{reason}" )]
pub struct StagedLoadFailure {
    pub addin_id: String,
    pub reason: String,
}

enum Staged {
    Node( String, Arc<dyn CandidateNode> ),
    Failure( StagedLoadFailure ),
}

#[derive( Default )]
struct MemoryRegistryState {
    root: Option<PathBuf>,
    published: HashMap<String, Vec<Arc<dyn CandidateNode>>>,
    staged: Vec<Staged>,
    refresh_count: usize,
}

/// Registry gateway backed by in-memory registrations.
#[derive( Default )]
pub struct MemoryRegistry {
    state: Mutex<MemoryRegistryState>,
    events: RegistryEvents,
}

impl MemoryRegistry {

    pub fn new() -> Self { Self::default() }

    fn lock( &self ) -> MutexGuard<'_, MemoryRegistryState> {
        self.state.lock().unwrap_or_else( PoisonError::into_inner )
    }

    /// Stages `node` under `extension_point`. Visible after the next refresh.
    pub fn register( &self, extension_point: impl Into<String>, node: impl CandidateNode + 'static ) {
        self.register_node( extension_point, Arc::new( node ));
    }

    pub fn register_node( &self, extension_point: impl Into<String>, node: Arc<dyn CandidateNode> ) {
        self.lock().staged.push( Staged::Node( extension_point.into(), node ));
    }

    /// Stages a load failure, reported through the load error handlers on the next refresh.
    pub fn register_failure( &self, addin_id: impl Into<String>, reason: impl Into<String> ) {
        self.lock().staged.push( Staged::Failure( StagedLoadFailure { addin_id: addin_id.into(), reason: reason.into() }));
    }

    /// Root directory given at initialisation.
    pub fn root( &self ) -> Option<PathBuf> { self.lock().root.clone() }

    /// How many times the registry has been refreshed.
    pub fn refresh_count( &self ) -> usize { self.lock().refresh_count }

}

impl RegistryGateway for MemoryRegistry {

    fn is_initialized( &self ) -> bool { self.lock().root.is_some() }

    fn initialize( &self, root_directory: &Path ) -> Result<(), RegistryError> {
        let _ = writeln!( console::stdout(), "Initializing in-memory registry at {}", root_directory.display() );
        self.lock().root = Some( root_directory.to_path_buf() );
        Ok(())
    }

    fn refresh_registry( &self ) -> Result<(), RegistryError> {

        let staged = {
            let mut state = self.lock();
            if state.root.is_none() { return Err( RegistryError::NotInitialized ) }
            state.refresh_count += 1 ;
            std::mem::take( &mut state.staged )
        };

        let _ = writeln!( console::stdout(), "Publishing {} staged registrations", staged.len() );

        staged.into_iter().for_each(| staged | match staged {
            Staged::Node( extension_point, node ) => {
                let addin_id = node.id().to_string();
                self.lock().published.entry( extension_point ).or_default().push( node );
                self.events.emit_loaded( &addin_id );
            },
            Staged::Failure( failure ) => self.events.emit_load_error(
                &format!( "Failed to load {}", failure.addin_id ),
                &failure,
            ),
        });

        Ok(())

    }

    fn enumerate_candidates( &self, extension_point: &str ) -> Result<Vec<Arc<dyn CandidateNode>>, RegistryError> {
        let state = self.lock();
        if state.root.is_none() { return Err( RegistryError::NotInitialized ) }
        Ok( state.published.get( extension_point ).cloned().unwrap_or_default() )
    }

    fn on_loaded( &self, handler: LoadedHandler ) { self.events.subscribe_loaded( handler ) }

    fn on_load_error( &self, handler: LoadErrorHandler ) { self.events.subscribe_load_error( handler ) }

}

impl std::fmt::Debug for MemoryRegistry {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct( "MemoryRegistry" )
            .field( "root", &state.root )
            .field( "extension_points", &state.published.keys().collect::<Vec<_>>() )
            .field( "staged", &state.staged.len() )
            .field( "events", &self.events )
            .finish()
    }
}
