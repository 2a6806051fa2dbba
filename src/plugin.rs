//! The plugin capability.
//!
//! A host decides what a plugin is able to do; the loader only needs to know how
//! to tear one down. Host plugin contracts extend [`Plugin`] and the loader is
//! parameterised over the resulting type.

/// Error type used at every boundary where host code may fail.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static> ;

/// The minimum contract every loadable plugin fulfils.
///
/// `'static` is required so instances produced by a registry as `Box<dyn Any>`
/// can be downcast into the concrete plugin type.
///
/// # Example
///
/// ```
/// use addin_loader::{ Plugin, BoxError };
///
/// trait Greeter: Plugin {
///     fn greet( &self ) -> String ;
/// }
///
/// struct English ;
/// impl Plugin for English {
///     fn dispose( &mut self ) -> Result<(), BoxError> { Ok(()) }
/// }
/// impl Greeter for English {
///     fn greet( &self ) -> String { "hello".to_string() }
/// }
///
/// // Trait objects are plugins too, so a loader may be typed over `Box<dyn Greeter>`.
/// let mut plugin: Box<dyn Greeter> = Box::new( English );
/// assert_eq!( plugin.greet(), "hello" );
/// plugin.dispose().unwrap();
/// ```
pub trait Plugin: 'static {
    /// Releases whatever the plugin holds. Called at most once by the loader.
    ///
    /// # Errors
    /// Any error the plugin reports while tearing down; the loader stops at the
    /// first one.
    fn dispose( &mut self ) -> Result<(), BoxError> ;
}

impl<T: Plugin + ?Sized> Plugin for Box<T> {
    fn dispose( &mut self ) -> Result<(), BoxError> { ( **self ).dispose() }
}
