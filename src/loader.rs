//! The plugin loader.
//!
//! A [`Loader`] holds an ordered list of extension points, at most one
//! [`Constraint`] and one [`Filter`] per point, an [`Initialiser`], and the
//! plugins it has loaded so far. [`Loader::load`] walks the extension points in
//! registration order:
//!
//! 1. the bound constraint, if any, is evaluated; a violation aborts the pass,
//! 2. the registry enumerates the point's candidates,
//! 3. candidates rejected by the bound filter are skipped,
//! 4. the rest are instantiated, initialised and appended to [`Loader::plugins`].
//!
//! Nothing is rolled back when a pass aborts: plugins loaded from earlier
//! points stay loaded.

use std::any::type_name ;
use std::collections::HashMap ;
use std::collections::hash_map::Entry ;
use std::path::PathBuf ;
use std::sync::Arc ;
use thiserror::Error ;
use tracing::{ debug, error, info, warn };

use crate::{ BoxError, Plugin };
use crate::bootstrap::{ Bootstrap, BootstrapError, RegistryState };
use crate::config::BootstrapConfig ;
use crate::constraint::{ Constraint, ConstraintError };
use crate::filter::Filter ;
use crate::initialiser::{ Initialiser, NoopInitialiser };
use crate::registry::{ CandidateNode, RegistryGateway, RegistryError };
use crate::registry_cache::RegistryCache ;



/// Errors that abort a load pass.
///
/// Plugins appended before the error stay in [`Loader::plugins`].
#[derive( Debug, Error )]
pub enum LoadError {
    /// A constraint bound to an extension point was violated.
    #[error( "Constraint Violation: {0}" )] Constraint( #[from] ConstraintError ),
    /// The registry could not enumerate an extension point.
    #[error( "Registry Error: {0}" )] Registry( #[from] RegistryError ),
    /// A candidate failed to produce an instance.
    #[error( "Failed to instantiate {path}: {source}" )]
    Instantiate { path: String, #[source] source: BoxError },
    /// A candidate produced an instance of the wrong type.
    #[error( "Candidate {path} is not a {expected}" )]
    TypeMismatch { path: String, expected: &'static str },
    /// The initialiser rejected a freshly instantiated plugin.
    #[error( "Failed to initialise {path}: {source}" )]
    Initialise { path: String, #[source] source: BoxError },
    /// The loader has already been disposed.
    #[error( "Loader already disposed" )] Disposed,
}

/// A second constraint or filter for the same extension point. The first binding is kept.
#[derive( Debug, Error )]
pub enum BindingError {
    #[error( "A constraint is already bound to {0}" )] DuplicateConstraint( String ),
    #[error( "A filter is already bound to {0}" )] DuplicateFilter( String ),
}

/// The first plugin teardown that failed. Plugins after it were not torn down.
#[derive( Debug, Error )]
#[error( "Failed to dispose plugin #{index}: {source}" )]
pub struct DisposeError {
    pub index: usize,
    #[source] pub source: BoxError,
}

/// Discovers, instantiates and owns plugins of type `P`.
///
/// Constructing a loader bootstraps the registry once per process, see
/// [`crate::bootstrap`].
///
/// # Example
///
/// ```
/// use std::sync::Arc ;
/// use addin_loader::{ Loader, MemoryRegistry, FactoryNode, CountConstraint, Plugin, BoxError };
///
/// struct Module( &'static str );
/// impl Plugin for Module {
///     fn dispose( &mut self ) -> Result<(), BoxError> { Ok(()) }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Arc::new( MemoryRegistry::new());
/// registry.register( "/app/modules", FactoryNode::new( "scene", || Module( "scene" )));
///
/// let mut loader = Loader::<Module>::new( registry )?;
/// loader.add_constraint( "/app/modules", CountConstraint::exactly( 1 ))?;
/// loader.load_extension_point( "/app/modules" )?;
///
/// assert_eq!( loader.plugins().len(), 1 );
/// assert_eq!( loader.plugins()[ 0 ].0, "scene" );
/// loader.dispose()?;
/// # Ok(())
/// # }
/// ```
pub struct Loader<P: Plugin> {
    registry: Arc<dyn RegistryGateway>,
    extension_points: Vec<String>,
    constraints: HashMap<String, Box<dyn Constraint>>,
    filters: HashMap<String, Box<dyn Filter>>,
    initialiser: Box<dyn Initialiser<P>>,
    loaded: Vec<P>,
    disposed: bool,
}

impl<P: Plugin> Loader<P> {

    /// Loader with the default initialiser, bootstrapping the registry at `"."`.
    ///
    /// # Errors
    /// See [`LoaderBuilder::build`].
    pub fn new( registry: Arc<dyn RegistryGateway> ) -> Result<Self, BootstrapError> {
        Self::builder( registry ).build()
    }

    /// Loader with `initialiser`, bootstrapping the registry at `"."`.
    ///
    /// # Errors
    /// See [`LoaderBuilder::build`].
    pub fn with_initialiser(
        registry: Arc<dyn RegistryGateway>,
        initialiser: impl Initialiser<P> + 'static,
    ) -> Result<Self, BootstrapError> {
        Self::builder( registry ).initialiser( initialiser ).build()
    }

    /// Loader with `initialiser`, bootstrapping the registry at `root_dir`.
    ///
    /// # Errors
    /// See [`LoaderBuilder::build`].
    pub fn with_initialiser_in(
        registry: Arc<dyn RegistryGateway>,
        initialiser: impl Initialiser<P> + 'static,
        root_dir: impl Into<PathBuf>,
    ) -> Result<Self, BootstrapError> {
        Self::builder( registry ).initialiser( initialiser ).root_dir( root_dir ).build()
    }

    pub fn builder( registry: Arc<dyn RegistryGateway> ) -> LoaderBuilder<P> {
        LoaderBuilder::new( registry )
    }

    /// Registers an extension point for the next load pass.
    ///
    /// Registering the same point twice makes every pass process it twice.
    pub fn add_extension_point( &mut self, extension_point: impl Into<String> ) {
        self.extension_points.push( extension_point.into() );
    }

    /// Binds `constraint` to `extension_point`.
    ///
    /// # Errors
    /// [`BindingError::DuplicateConstraint`] if a constraint is already bound there.
    pub fn add_constraint(
        &mut self,
        extension_point: impl Into<String>,
        constraint: impl Constraint + 'static,
    ) -> Result<(), BindingError> {
        match self.constraints.entry( extension_point.into() ) {
            Entry::Occupied( entry ) => Err( BindingError::DuplicateConstraint( entry.key().clone() )),
            Entry::Vacant( entry ) => { entry.insert( Box::new( constraint )); Ok(()) },
        }
    }

    /// Binds `filter` to `extension_point`.
    ///
    /// # Errors
    /// [`BindingError::DuplicateFilter`] if a filter is already bound there.
    pub fn add_filter(
        &mut self,
        extension_point: impl Into<String>,
        filter: impl Filter + 'static,
    ) -> Result<(), BindingError> {
        match self.filters.entry( extension_point.into() ) {
            Entry::Occupied( entry ) => Err( BindingError::DuplicateFilter( entry.key().clone() )),
            Entry::Vacant( entry ) => { entry.insert( Box::new( filter )); Ok(()) },
        }
    }

    /// Registers `extension_point` and runs a full load pass.
    ///
    /// # Errors
    /// See [`Loader::load`].
    pub fn load_extension_point( &mut self, extension_point: impl Into<String> ) -> Result<(), LoadError> {
        self.add_extension_point( extension_point );
        self.load()
    }

    /// Processes every registered extension point in registration order.
    ///
    /// Each pass starts from the first registered point again, so calling this
    /// twice loads every candidate twice.
    ///
    /// # Errors
    /// The first [`LoadError`] encountered; later extension points are not processed.
    pub fn load( &mut self ) -> Result<(), LoadError> {

        if self.disposed { return Err( LoadError::Disposed ) }

        self.extension_points.iter().try_for_each(| extension_point | load_extension_point(
            self.registry.as_ref(),
            extension_point,
            self.constraints.get( extension_point ).map(| constraint | &**constraint ),
            self.filters.get( extension_point ).map(| filter | &**filter ),
            self.initialiser.as_ref(),
            &mut self.loaded,
        ))

    }

    /// Tears down every loaded plugin in insertion order.
    ///
    /// Runs at most once; later calls return `Ok` without touching any plugin.
    /// Stops at the first failing plugin. Plugins are torn down, not removed, so
    /// they remain visible through [`plugins`]( Self::plugins ).
    ///
    /// # Errors
    /// The first [`DisposeError`].
    pub fn dispose( &mut self ) -> Result<(), DisposeError> {
        if std::mem::replace( &mut self.disposed, true ) { return Ok(()) }
        self.loaded.iter_mut().enumerate().try_for_each(|( index, plugin )| plugin
            .dispose()
            .map_err(| source | DisposeError { index, source })
        )
    }

    /// Plugins loaded so far, in load order.
    #[inline] pub fn plugins( &self ) -> &[P] { &self.loaded }

    /// Registered extension points, in registration order.
    #[inline] pub fn extension_points( &self ) -> &[String] { &self.extension_points }

    #[inline] pub fn initialiser( &self ) -> &dyn Initialiser<P> { self.initialiser.as_ref() }

    /// Replaces the initialiser used by later load passes.
    pub fn set_initialiser( &mut self, initialiser: impl Initialiser<P> + 'static ) {
        self.initialiser = Box::new( initialiser );
    }

    #[inline] pub fn is_disposed( &self ) -> bool { self.disposed }

}

fn load_extension_point<P: Plugin>(
    registry: &dyn RegistryGateway,
    extension_point: &str,
    constraint: Option<&dyn Constraint>,
    filter: Option<&dyn Filter>,
    initialiser: &dyn Initialiser<P>,
    loaded: &mut Vec<P>,
) -> Result<(), LoadError> {

    info!( extension_point, "Loading extension point" );

    if let Some( constraint ) = constraint {
        if !constraint.apply( extension_point, registry )? {
            warn!( extension_point, "Failed constraint: {}", constraint.message() );
        }
    }

    registry.enumerate_candidates( extension_point )?
        .into_iter()
        .filter(| node | {
            debug!( extension_point, path = node.path(), "Trying plugin" );
            filter.is_none_or(| filter | filter.apply( &**node ))
        })
        .try_for_each(| node | {
            let plugin = instantiate::<P>( &*node, initialiser )?;
            loaded.push( plugin );
            Ok(())
        })

}

fn instantiate<P: Plugin>( node: &dyn CandidateNode, initialiser: &dyn Initialiser<P> ) -> Result<P, LoadError> {

    let instance = node.create_instance()
        .map_err(| source | LoadError::Instantiate { path: node.path().to_string(), source })?;

    let mut plugin = *instance.downcast::<P>()
        .map_err(| _ | LoadError::TypeMismatch { path: node.path().to_string(), expected: type_name::<P>() })?;

    initialiser.initialise( &mut plugin )
        .map_err(| source | LoadError::Initialise { path: node.path().to_string(), source })?;

    Ok( plugin )

}

impl<P: Plugin> Drop for Loader<P> {
    fn drop( &mut self ) {
        if let Err( err ) = self.dispose() {
            error!( "Failed to dispose plugins on drop: {}", err );
        }
    }
}

impl<P: Plugin + std::fmt::Debug> std::fmt::Debug for Loader<P> {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "Loader" )
            .field( "extension_points", &self.extension_points )
            .field( "constraints", &self.constraints.keys().collect::<Vec<_>>() )
            .field( "filters", &self.filters.keys().collect::<Vec<_>>() )
            .field( "loaded", &self.loaded )
            .field( "disposed", &self.disposed )
            .finish_non_exhaustive()
    }
}

/// Configures and constructs a [`Loader`].
#[must_use = "call .build() to bootstrap the registry and create the Loader"]
pub struct LoaderBuilder<P: Plugin> {
    registry: Arc<dyn RegistryGateway>,
    initialiser: Box<dyn Initialiser<P>>,
    state: &'static RegistryState,
    bootstrap: Bootstrap,
}

impl<P: Plugin> LoaderBuilder<P> {

    /// Builder using the process-wide [`RegistryState`] and [`BootstrapConfig::default`].
    pub fn new( registry: Arc<dyn RegistryGateway> ) -> Self {
        Self {
            registry,
            initialiser: Box::new( NoopInitialiser ),
            state: RegistryState::global(),
            bootstrap: Bootstrap::from_config( &BootstrapConfig::default() ),
        }
    }

    pub fn initialiser( mut self, initialiser: impl Initialiser<P> + 'static ) -> Self {
        self.initialiser = Box::new( initialiser );
        self
    }

    /// Directory the registry is initialised at. Defaults to `"."`.
    pub fn root_dir( mut self, root_dir: impl Into<PathBuf> ) -> Self {
        self.bootstrap = self.bootstrap.with_root_dir( root_dir );
        self
    }

    /// Replaces every bootstrap setting with those of `config`.
    pub fn config( mut self, config: &BootstrapConfig ) -> Self {
        self.bootstrap = Bootstrap::from_config( config );
        self
    }

    /// Bootstrap state to consult instead of the process-wide one.
    pub fn registry_state( mut self, state: &'static RegistryState ) -> Self {
        self.state = state ;
        self
    }

    /// Cache cleared before the first bootstrap, replacing the default directories.
    pub fn registry_cache( mut self, cache: impl RegistryCache + 'static ) -> Self {
        self.bootstrap = self.bootstrap.with_cache( cache );
        self
    }

    /// Skips cache clearing altogether.
    pub fn keep_registry_cache( mut self ) -> Self {
        self.bootstrap = self.bootstrap.without_cache();
        self
    }

    pub fn suppress_output( mut self, suppress_output: bool ) -> Self {
        self.bootstrap = self.bootstrap.with_suppress_output( suppress_output );
        self
    }

    /// Bootstraps the registry if this process has not yet done so, then creates the loader.
    ///
    /// # Errors
    /// [`BootstrapError`] if the registry fails to initialise or refresh.
    pub fn build( self ) -> Result<Loader<P>, BootstrapError> {
        self.state.ensure_initialized( self.registry.as_ref(), &self.bootstrap )?;
        Ok( Loader {
            registry: self.registry,
            extension_points: Vec::new(),
            constraints: HashMap::new(),
            filters: HashMap::new(),
            initialiser: self.initialiser,
            loaded: Vec::new(),
            disposed: false,
        })
    }

}

impl<P: Plugin> std::fmt::Debug for LoaderBuilder<P> {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "LoaderBuilder" )
            .field( "state", &self.state )
            .field( "bootstrap", &self.bootstrap )
            .finish_non_exhaustive()
    }
}
