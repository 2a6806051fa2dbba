//! A generic plugin loader for modular applications.
//!
//! The host defines what a plugin is, as a trait extending [`Plugin`], and
//! supplies an extension registry through [`RegistryGateway`]. `addin_loader`
//! discovers the candidates registered under named **extension points**,
//! optionally checks how many there are, optionally filters them, instantiates
//! and initialises the survivors, and tears them all down again at the end.
//!
//! # Core Concepts
//!
//! - **Extension point**: a named category of pluggable behaviour, e.g.
//! 	`"/app/region-modules"`. Points are processed in registration order.
//!
//! - [`CandidateNode`]: a discovered, not yet instantiated plugin entry. Nodes
//! 	belong to the registry; the loader only reads them.
//!
//! - [`Constraint`]: a rule over the candidate set of one extension point.
//! 	[`CountConstraint`] bounds the number of candidates. A violation stops the
//! 	whole load pass.
//!
//! - [`Filter`]: an accept/reject predicate applied to each candidate before it
//! 	is instantiated. [`IdFilter`] keeps the candidate with a given id.
//!
//! - [`Initialiser`]: host setup run on every fresh instance before it counts as loaded.
//!
//! - [`Loader`]: the orchestrator tying the above together and owning the result.
//!
//! # Registry bootstrap
//!
//! The registry is process-wide state. The first [`Loader`] constructed in a
//! process clears the registry's stale cache, initialises and refreshes it with
//! standard output suppressed; later loaders find it ready. See [`bootstrap`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc ;
//! use addin_loader::{ Loader, MemoryRegistry, FactoryNode, IdFilter, Plugin, BoxError };
//!
//! trait Renderer: Plugin {
//! 	fn name( &self ) -> &str ;
//! }
//!
//! struct Named( &'static str );
//! impl Plugin for Named {
//! 	fn dispose( &mut self ) -> Result<(), BoxError> { Ok(()) }
//! }
//! impl Renderer for Named {
//! 	fn name( &self ) -> &str { self.0 }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Nodes hand out instances of exactly the type the loader is parameterised over.
//! let registry = Arc::new( MemoryRegistry::new());
//! registry.register( "/app/renderers", FactoryNode::new( "gl", || Box::new( Named( "gl" )) as Box<dyn Renderer> ));
//! registry.register( "/app/renderers", FactoryNode::new( "vk", || Box::new( Named( "vk" )) as Box<dyn Renderer> ));
//!
//! let mut loader = Loader::<Box<dyn Renderer>>::builder( registry )
//! 	.keep_registry_cache()
//! 	.build()?;
//! loader.add_filter( "/app/renderers", IdFilter::new( "vk" ))?;
//! loader.load_extension_point( "/app/renderers" )?;
//!
//! let names = loader.plugins().iter().map(| renderer | renderer.name() ).collect::<Vec<_>>();
//! assert_eq!( names, [ "vk" ]);
//!
//! loader.dispose()?;
//! # Ok(())
//! # }
//! ```

mod plugin ;
mod registry ;
mod constraint ;
mod filter ;
mod initialiser ;
mod registry_cache ;
mod config ;
mod loader ;
mod memory_registry ;
mod manifest_registry ;
pub mod bootstrap ;
pub mod console ;

pub use plugin::{ Plugin, BoxError };
pub use registry::{ RegistryGateway, CandidateNode, RegistryEvents, RegistryError, LoadedHandler, LoadErrorHandler };
pub use constraint::{ Constraint, CountConstraint, ConstraintError };
pub use filter::{ Filter, IdFilter };
pub use initialiser::{ Initialiser, NoopInitialiser };
pub use registry_cache::{ RegistryCache, CacheDirectories };
pub use config::{ BootstrapConfig, ConfigError };
pub use bootstrap::{ RegistryState, Bootstrap, BootstrapError };
pub use loader::{ Loader, LoaderBuilder, LoadError, BindingError, DisposeError };
pub use memory_registry::{ MemoryRegistry, FactoryNode, StagedLoadFailure };
pub use manifest_registry::{ ManifestRegistry, ManifestNode, ManifestFactory, ManifestError };
