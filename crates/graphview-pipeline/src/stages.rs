//! Stage contracts.
//!
//! An endpoint supplies four plain functions, one per stage. Each receives
//! the endpoint's application context, the validated request parameters,
//! the request context, and the outputs of every earlier stage.
//!
//! ```text
//! skeleton(params)                  -> SkeletonState      async
//! hydration(skeleton)               -> HydrationState     async
//! rules(skeleton, &mut hydration)                         sync
//! presentation(skeleton, hydration) -> Vec<Item>          sync
//! ```
//!
//! Async stages return a [`BoxFuture`] tied to the input's lifetime, so they
//! are written as `fn` items:
//!
//! ```ignore
//! fn skeleton<'a>(input: SkeletonInput<'a, AppContext, Params>)
//!     -> BoxFuture<'a, ServiceResult<SkeletonState>>
//! {
//!     Box::pin(async move { /* ... */ })
//! }
//! ```

use crate::skeleton::SkeletonState;
use graphview_core::{BoxFuture, RequestContext, ServiceResult};
use graphview_hydration::HydrationState;

/// Input to the skeleton stage.
#[derive(Debug)]
pub struct SkeletonInput<'a, Ctx, P> {
    /// Application context.
    pub app: &'a Ctx,
    /// Request parameters.
    pub params: &'a P,
    /// Request context.
    pub request: &'a RequestContext,
}

/// Input to the hydration stage.
#[derive(Debug)]
pub struct HydrationInput<'a, Ctx, P> {
    /// Application context.
    pub app: &'a Ctx,
    /// Request parameters.
    pub params: &'a P,
    /// Request context.
    pub request: &'a RequestContext,
    /// The skeleton to hydrate.
    pub skeleton: &'a SkeletonState,
}

/// Input to the rules stage. The only stage that may modify an earlier
/// stage's output.
#[derive(Debug)]
pub struct RulesInput<'a, Ctx, P> {
    /// Application context.
    pub app: &'a Ctx,
    /// Request parameters.
    pub params: &'a P,
    /// Request context.
    pub request: &'a RequestContext,
    /// The skeleton.
    pub skeleton: &'a SkeletonState,
    /// Hydrated records; entries may be removed or marked invalid.
    pub hydration: &'a mut HydrationState,
}

/// Input to the presentation stage.
#[derive(Debug)]
pub struct PresentationInput<'a, Ctx, P> {
    /// Application context.
    pub app: &'a Ctx,
    /// Request parameters.
    pub params: &'a P,
    /// Request context.
    pub request: &'a RequestContext,
    /// The skeleton, whose order the response keeps.
    pub skeleton: &'a SkeletonState,
    /// Hydrated records after rules.
    pub hydration: &'a HydrationState,
}

/// Selects the ordered ids of one page.
pub trait Skeleton<Ctx, P>: Send + Sync {
    /// Runs the stage.
    fn skeleton<'a>(
        &'a self,
        input: SkeletonInput<'a, Ctx, P>,
    ) -> BoxFuture<'a, ServiceResult<SkeletonState>>;
}

impl<Ctx, P, F> Skeleton<Ctx, P> for F
where
    F: for<'a> Fn(SkeletonInput<'a, Ctx, P>) -> BoxFuture<'a, ServiceResult<SkeletonState>>
        + Send
        + Sync,
{
    fn skeleton<'a>(
        &'a self,
        input: SkeletonInput<'a, Ctx, P>,
    ) -> BoxFuture<'a, ServiceResult<SkeletonState>> {
        self(input)
    }
}

/// Fetches the records the skeleton refers to.
pub trait Hydration<Ctx, P>: Send + Sync {
    /// Runs the stage.
    fn hydrate<'a>(
        &'a self,
        input: HydrationInput<'a, Ctx, P>,
    ) -> BoxFuture<'a, ServiceResult<HydrationState>>;
}

impl<Ctx, P, F> Hydration<Ctx, P> for F
where
    F: for<'a> Fn(HydrationInput<'a, Ctx, P>) -> BoxFuture<'a, ServiceResult<HydrationState>>
        + Send
        + Sync,
{
    fn hydrate<'a>(
        &'a self,
        input: HydrationInput<'a, Ctx, P>,
    ) -> BoxFuture<'a, ServiceResult<HydrationState>> {
        self(input)
    }
}

/// Removes or invalidates hydrated entries the viewer must not see.
pub trait Rules<Ctx, P>: Send + Sync {
    /// Runs the stage.
    fn apply(&self, input: RulesInput<'_, Ctx, P>);
}

impl<Ctx, P, F> Rules<Ctx, P> for F
where
    F: Fn(RulesInput<'_, Ctx, P>) + Send + Sync,
{
    fn apply(&self, input: RulesInput<'_, Ctx, P>) {
        self(input);
    }
}

/// Renders the surviving ids, in skeleton order.
pub trait Presentation<Ctx, P, T>: Send + Sync {
    /// Runs the stage.
    fn present(&self, input: PresentationInput<'_, Ctx, P>) -> Vec<T>;
}

impl<Ctx, P, T, F> Presentation<Ctx, P, T> for F
where
    F: Fn(PresentationInput<'_, Ctx, P>) -> Vec<T> + Send + Sync,
{
    fn present(&self, input: PresentationInput<'_, Ctx, P>) -> Vec<T> {
        self(input)
    }
}

/// The default rules stage: changes nothing.
pub fn no_rules<Ctx, P>(_input: RulesInput<'_, Ctx, P>) {}
