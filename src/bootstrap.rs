//! One-time, process-wide registry bootstrap.
//!
//! The extension registry is process-wide shared state: however many loaders a
//! host constructs, the registry is initialised once. [`RegistryState`] is that
//! state, deliberately global and never reset. [`RegistryState::global`] is the
//! instance loaders use by default; hosts and tests may hand a loader another
//! `'static` state to keep separate registries apart.
//!
//! The first bootstrap:
//! 1. subscribes logging handlers to the registry's load notifications (once
//!    per state, retries included),
//! 2. clears the registry's on-disk cache (best effort),
//! 3. suppresses standard output while the registry works,
//! 4. initialises the registry at its root directory and refreshes it.
//!
//! Later bootstraps skip all of the above, including the cache deletion, which
//! would pull the cache from under a live registry.

use std::path::{ Path, PathBuf };
use std::sync::{ Condvar, Mutex, MutexGuard, PoisonError };
use std::thread::{ self, ThreadId };
use thiserror::Error ;
use tracing::{ debug, error, info, warn };

use crate::config::BootstrapConfig ;
use crate::console::OutputSuppression ;
use crate::registry::{ RegistryGateway, RegistryError, error_chain };
use crate::registry_cache::RegistryCache ;



static GLOBAL_REGISTRY_STATE: RegistryState = RegistryState::new();

#[derive( Debug, Error )]
pub enum BootstrapError {
    /// Initialising or refreshing the registry failed. Console output has been restored.
    #[error( "Registry bootstrap failed: {0}" )] Registry( #[from] RegistryError ),
}

#[derive( Debug, Default, Clone, Copy, PartialEq, Eq )]
enum Phase {
    #[default]
    Uninitialized,
    Running( ThreadId ),
    Initialized,
}

#[derive( Debug, Default )]
struct Progress {
    phase: Phase,
    subscribed: bool,
}

/// Whether the registry has been bootstrapped.
///
/// Two states, `Uninitialized` and `Initialized`; the second is terminal. While
/// a bootstrap runs, loaders built from other threads wait for it, and loaders
/// built on the bootstrapping thread itself (from a registry notification
/// handler, say) return at once without bootstrapping.
#[derive( Debug, Default )]
pub struct RegistryState {
    progress: Mutex<Progress>,
    settled: Condvar,
}

impl RegistryState {

    pub const fn new() -> Self {
        Self {
            progress: Mutex::new( Progress { phase: Phase::Uninitialized, subscribed: false }),
            settled: Condvar::new(),
        }
    }

    /// The process-wide state.
    pub fn global() -> &'static RegistryState { &GLOBAL_REGISTRY_STATE }

    fn lock( &self ) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else( PoisonError::into_inner )
    }

    pub fn is_initialized( &self ) -> bool { self.lock().phase == Phase::Initialized }

    /// Runs `bootstrap` against `registry` unless this state is already initialised.
    ///
    /// A registry that already reports itself initialised counts as bootstrapped
    /// and is left alone. Concurrent callers wait for the running bootstrap, so
    /// it runs once even when loaders are built from several threads. A call
    /// made on the thread that is running the bootstrap is a no-op.
    ///
    /// The logging handlers are subscribed once per state, even when a failed
    /// bootstrap is retried.
    ///
    /// # Errors
    /// [`BootstrapError::Registry`] if the registry fails to initialise or
    /// refresh. The state stays uninitialised and the next call retries.
    pub fn ensure_initialized( &self, registry: &dyn RegistryGateway, bootstrap: &Bootstrap ) -> Result<(), BootstrapError> {

        let mut progress = self.lock();

        loop {
            let phase = progress.phase ;
            match phase {
                Phase::Initialized => {
                    debug!( "Registry already initialized" );
                    return Ok(());
                },
                Phase::Running( thread ) if thread == thread::current().id() => {
                    debug!( "Registry bootstrap already running on this thread" );
                    return Ok(());
                },
                Phase::Running( _ ) => progress = self.settled.wait( progress ).unwrap_or_else( PoisonError::into_inner ),
                Phase::Uninitialized => break,
            }
        }

        if registry.is_initialized() {
            debug!( "Registry initialized elsewhere" );
            progress.phase = Phase::Initialized ;
            return Ok(());
        }

        progress.phase = Phase::Running( thread::current().id() );
        let subscribe = !std::mem::replace( &mut progress.subscribed, true );
        drop( progress );

        let mut settle = Settle { state: self, succeeded: false };
        bootstrap.run( registry, subscribe )?;
        settle.succeeded = true ;
        Ok(())

    }

}

/// Leaves the running phase on every exit path, panics included, and wakes waiters.
struct Settle<'a> {
    state: &'a RegistryState,
    succeeded: bool,
}

impl Drop for Settle<'_> {
    fn drop( &mut self ) {
        self.state.lock().phase = match self.succeeded {
            true => Phase::Initialized,
            false => Phase::Uninitialized,
        };
        self.state.settled.notify_all();
    }
}

/// The steps of a first bootstrap and their settings.
pub struct Bootstrap {
    root_dir: PathBuf,
    cache: Option<Box<dyn RegistryCache>>,
    suppress_output: bool,
}

impl Bootstrap {

    /// Bootstrap at `root_dir` with output suppression and no cache clearing.
    pub fn new( root_dir: impl Into<PathBuf> ) -> Self {
        Self { root_dir: root_dir.into(), cache: None, suppress_output: true }
    }

    pub fn from_config( config: &BootstrapConfig ) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            cache: config.registry_cache().map(| cache | Box::new( cache ) as Box<dyn RegistryCache> ),
            suppress_output: config.suppress_output,
        }
    }

    pub fn with_cache( mut self, cache: impl RegistryCache + 'static ) -> Self {
        self.cache = Some( Box::new( cache ));
        self
    }

    pub fn without_cache( mut self ) -> Self {
        self.cache = None ;
        self
    }

    pub fn with_suppress_output( mut self, suppress_output: bool ) -> Self {
        self.suppress_output = suppress_output ;
        self
    }

    pub fn with_root_dir( mut self, root_dir: impl Into<PathBuf> ) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    #[inline] pub fn root_dir( &self ) -> &Path { &self.root_dir }

    fn run( &self, registry: &dyn RegistryGateway, subscribe: bool ) -> Result<(), RegistryError> {

        info!( root = %self.root_dir.display(), "Initializing plugin registry" );

        if subscribe { Self::subscribe_logging( registry ) }

        if let Some( cache ) = &self.cache {
            if let Err( err ) = cache.clear() {
                warn!( "Failed to clear registry cache, continuing with it in place: {}", err );
            }
        }

        let _quiet = self.suppress_output.then( OutputSuppression::acquire );
        registry.initialize( &self.root_dir )?;
        registry.refresh_registry()

    }

    fn subscribe_logging( registry: &dyn RegistryGateway ) {
        registry.on_load_error( Box::new(| message: &str, err: &( dyn std::error::Error + 'static )| {
            error!( "Plugin error: {}: {}", message, error_chain( err ));
        }));
        registry.on_loaded( Box::new(| addin_id: &str | {
            info!( addin = addin_id, "Plugin loaded" );
        }));
    }

}

impl std::fmt::Debug for Bootstrap {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "Bootstrap" )
            .field( "root_dir", &self.root_dir )
            .field( "cache", &self.cache.as_ref().map(| _ | "<cache>" ))
            .field( "suppress_output", &self.suppress_output )
            .finish()
    }
}
