//! BoxModelAdapter -- object-safe dynamic dispatch wrapper for ModelAdapter.
//!
//! 1. Define an object-safe `ModelAdapterDyn` trait with boxed futures
//! 2. Blanket-impl `ModelAdapterDyn` for all `T: ModelAdapter`
//! 3. `BoxModelAdapter` wraps `Box<dyn ModelAdapterDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use roundtable_types::model::{ModelError, ModelRequest};

use super::adapter::ModelAdapter;

/// Object-safe version of [`ModelAdapter`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch
/// (`dyn ModelAdapterDyn`). A blanket implementation is provided for
/// all types implementing `ModelAdapter`.
pub trait ModelAdapterDyn: Send + Sync {
    fn name(&self) -> &str;

    fn call_boxed<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ModelError>> + Send + 'a>>;
}

/// Blanket implementation: any `ModelAdapter` automatically implements
/// `ModelAdapterDyn`.
impl<T: ModelAdapter> ModelAdapterDyn for T {
    fn name(&self) -> &str {
        ModelAdapter::name(self)
    }

    fn call_boxed<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ModelError>> + Send + 'a>> {
        Box::pin(self.call(request))
    }
}

/// Type-erased model adapter for runtime backend selection.
///
/// Since `ModelAdapter` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxModelAdapter` provides equivalent methods that delegate
/// to the inner `ModelAdapterDyn` trait object.
pub struct BoxModelAdapter {
    inner: Box<dyn ModelAdapterDyn + Send + Sync>,
}

impl BoxModelAdapter {
    /// Wrap a concrete `ModelAdapter` in a type-erased box.
    pub fn new<T: ModelAdapter + 'static>(adapter: T) -> Self {
        Self {
            inner: Box::new(adapter),
        }
    }

    /// Human-readable adapter name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send the turns and return the assistant's text.
    pub async fn call(&self, request: &ModelRequest) -> Result<String, ModelError> {
        self.inner.call_boxed(request).await
    }
}
