//! Action dispatch pipeline.
//!
//! A minimal unidirectional dispatch seam: actions enter at the front,
//! traverse an ordered chain of [`Middleware`], and land in a terminal sink
//! (the store, in a full application). The store itself stays external; this
//! module only provides the chain the relay components plug into.
//!
//! # Example
//!
//! ```
//! use socket_relay::{Action, Dispatch, Pipeline};
//! use socket_relay::pipeline::middleware_fn;
//!
//! let pass_through = middleware_fn(
//!     |_: &Dispatch, action: Action, next: &mut dyn FnMut(Action)| next(action),
//! );
//!
//! let pipeline = Pipeline::builder()
//!     .with(pass_through)
//!     .sink(|action| println!("reduced: {}", action.kind()))
//!     .build();
//!
//! pipeline.dispatch(Action::new("CART_ADD"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::trace;

use crate::action::Action;

// ============================================================================
// Middleware
// ============================================================================

/// A handler in the dispatch chain.
///
/// Implementations receive every dispatched action, may act on it, and
/// decide whether it continues: calling `next` passes the action onward,
/// not calling it swallows the action.
///
/// `dispatch` re-enters the pipeline from the front and may be cloned into
/// spawned tasks; this is how lifecycle actions flow back in.
pub trait Middleware: Send + Sync {
    /// Handles one action.
    fn handle(&self, dispatch: &Dispatch, action: Action, next: &mut dyn FnMut(Action));
}

/// Wraps a closure as a [`Middleware`].
///
/// ```
/// use socket_relay::{Action, Dispatch};
/// use socket_relay::pipeline::{Pipeline, middleware_fn};
///
/// let pipeline = Pipeline::builder()
///     .with(middleware_fn(
///         |_: &Dispatch, action: Action, next: &mut dyn FnMut(Action)| next(action),
///     ))
///     .build();
/// ```
pub fn middleware_fn<F>(f: F) -> impl Middleware
where
    F: Fn(&Dispatch, Action, &mut dyn FnMut(Action)) + Send + Sync + 'static,
{
    struct FnMiddleware<F>(F);

    impl<F> Middleware for FnMiddleware<F>
    where
        F: Fn(&Dispatch, Action, &mut dyn FnMut(Action)) + Send + Sync,
    {
        fn handle(&self, dispatch: &Dispatch, action: Action, next: &mut dyn FnMut(Action)) {
            (self.0)(dispatch, action, next);
        }
    }

    FnMiddleware(f)
}

// ============================================================================
// Types
// ============================================================================

/// Terminal sink receiving actions that traversed the whole chain.
type Sink = Box<dyn Fn(Action) + Send + Sync>;

/// Immutable chain shared by [`Pipeline`] and every [`Dispatch`] handle.
struct Chain {
    middlewares: Vec<Box<dyn Middleware>>,
    sink: Sink,
}

// ============================================================================
// Pipeline
// ============================================================================

/// An ordered middleware chain ending in a terminal sink.
pub struct Pipeline {
    chain: Arc<Chain>,
}

impl Pipeline {
    /// Creates a pipeline builder.
    #[inline]
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Dispatches an action through the chain.
    #[inline]
    pub fn dispatch(&self, action: Action) {
        self.dispatcher().call(action);
    }

    /// Returns a cloneable dispatch handle into this pipeline.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> Dispatch {
        Dispatch {
            chain: Arc::clone(&self.chain),
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Cloneable handle that re-enters the pipeline from the front.
///
/// `Send + Sync`; safe to clone into spawned tasks.
#[derive(Clone)]
pub struct Dispatch {
    chain: Arc<Chain>,
}

impl Dispatch {
    /// Dispatches an action through the chain.
    pub fn call(&self, action: Action) {
        trace!(kind = action.kind(), "Action dispatched");
        run(&self.chain, 0, self, action);
    }
}

/// Runs the chain from `index`; past the end, the sink receives the action.
fn run(chain: &Arc<Chain>, index: usize, dispatch: &Dispatch, action: Action) {
    match chain.middlewares.get(index) {
        Some(middleware) => {
            let mut next = |action: Action| run(chain, index + 1, dispatch, action);
            middleware.handle(dispatch, action, &mut next);
        }
        None => (chain.sink)(action),
    }
}

// ============================================================================
// PipelineBuilder
// ============================================================================

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    middlewares: Vec<Box<dyn Middleware>>,
    sink: Option<Sink>,
}

impl PipelineBuilder {
    /// Appends a middleware to the chain.
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Sets the terminal sink.
    ///
    /// Without one, actions reaching the end of the chain are dropped.
    #[must_use]
    pub fn sink(mut self, sink: impl Fn(Action) + Send + Sync + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(|action: Action| trace!(kind = action.kind(), "Action reached end of chain")));

        Pipeline {
            chain: Arc::new(Chain {
                middlewares: self.middlewares,
                sink,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
