//! The fixed-order pipeline runner.

use crate::paging::Page;
use crate::skeleton::SkeletonState;
use crate::stages::{
    Hydration, HydrationInput, Presentation, PresentationInput, Rules, RulesInput, Skeleton,
    SkeletonInput,
};
use graphview_core::{RequestContext, ServiceError, ServiceResult};
use graphview_hydration::HydrationState;
use graphview_telemetry::metrics::record_pipeline_run;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// An endpoint's four stages, run in a fixed order.
///
/// The runner owns the order and the contracts between stages:
///
/// - every skeleton id has an entry in the hydration state
/// - rules may remove or invalidate entries but never add, revive or
///   replace them
/// - presentation renders at most one item per skeleton id
///
/// A stage that breaks a contract fails the request with an internal error.
/// The cursor always comes from the skeleton, never from later stages.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new(skeleton, hydration, no_rules::<AppContext, Params>, presentation)
///     .named("app.bsky.graph.getLists")
///     .with_timeout(Duration::from_secs(5));
///
/// let page = pipeline.run(&app, params, &request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline<S, H, R, V> {
    skeleton: S,
    hydration: H,
    rules: R,
    presentation: V,
    name: &'static str,
    timeout: Option<Duration>,
}

impl<S, H, R, V> Pipeline<S, H, R, V> {
    /// Creates a pipeline from its four stages.
    pub fn new(skeleton: S, hydration: H, rules: R, presentation: V) -> Self {
        Self {
            skeleton,
            hydration,
            rules,
            presentation,
            name: "pipeline",
            timeout: None,
        }
    }

    /// Sets the name used in spans and metrics.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sets a deadline for the whole run.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs skeleton, hydration, rules and presentation for one request.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, [`ServiceError::Timeout`] when the
    /// deadline passes, or [`ServiceError::Internal`] when a stage breaks
    /// its contract.
    pub async fn run<Ctx, P, T>(
        &self,
        app: &Ctx,
        params: P,
        request: &RequestContext,
    ) -> ServiceResult<Page<T>>
    where
        Ctx: Sync,
        P: Send + Sync,
        S: Skeleton<Ctx, P>,
        H: Hydration<Ctx, P>,
        R: Rules<Ctx, P>,
        V: Presentation<Ctx, P, T>,
    {
        let started = Instant::now();
        let span = tracing::info_span!(
            "pipeline",
            endpoint = self.name,
            request_id = %request.request_id(),
            viewer = request.viewer().map(|did| did.as_str()),
        );

        let result = async {
            let execution = self.execute(app, &params, request);
            match self.timeout {
                Some(deadline) => match tokio::time::timeout(deadline, execution).await {
                    Ok(result) => result,
                    Err(_) => Err(ServiceError::timeout(format!(
                        "{} did not finish within {}ms",
                        self.name,
                        deadline.as_millis()
                    ))),
                },
                None => execution.await,
            }
        }
        .instrument(span.clone())
        .await;

        let elapsed = started.elapsed();
        let _entered = span.enter();
        match &result {
            Ok(page) => {
                tracing::debug!(
                    items = page.items.len(),
                    has_cursor = page.cursor.is_some(),
                    duration_ms = elapsed.as_millis() as u64,
                    "pipeline finished"
                );
                record_pipeline_run(self.name, "ok", elapsed);
            }
            Err(error) => {
                if matches!(error, ServiceError::Internal { .. }) {
                    tracing::error!(error = %error, "pipeline failed");
                } else {
                    tracing::warn!(error = %error, "pipeline failed");
                }
                record_pipeline_run(
                    self.name,
                    error.category().as_str(),
                    elapsed,
                );
            }
        }
        result
    }

    async fn execute<Ctx, P, T>(
        &self,
        app: &Ctx,
        params: &P,
        request: &RequestContext,
    ) -> ServiceResult<Page<T>>
    where
        Ctx: Sync,
        P: Send + Sync,
        S: Skeleton<Ctx, P>,
        H: Hydration<Ctx, P>,
        R: Rules<Ctx, P>,
        V: Presentation<Ctx, P, T>,
    {
        let skeleton = self
            .skeleton
            .skeleton(SkeletonInput {
                app,
                params,
                request,
            })
            .await?;
        tracing::trace!(ids = skeleton.len(), "skeleton ready");

        let mut hydration = self
            .hydration
            .hydrate(HydrationInput {
                app,
                params,
                request,
                skeleton: &skeleton,
            })
            .await?;
        check_hydrated(&skeleton, &hydration)?;

        let before = hydration.clone();
        self.rules.apply(RulesInput {
            app,
            params,
            request,
            skeleton: &skeleton,
            hydration: &mut hydration,
        });
        if let Some((key, widening)) = hydration.widened_since(&before) {
            return Err(ServiceError::internal(format!(
                "rules {widening} {key} in the hydration state"
            )));
        }

        let items = self.presentation.present(PresentationInput {
            app,
            params,
            request,
            skeleton: &skeleton,
            hydration: &hydration,
        });
        if items.len() > skeleton.len() {
            return Err(ServiceError::internal(format!(
                "presentation rendered {} items for {} skeleton ids",
                items.len(),
                skeleton.len()
            )));
        }

        Ok(Page {
            items,
            cursor: skeleton.cursor,
        })
    }
}

fn check_hydrated(skeleton: &SkeletonState, hydration: &HydrationState) -> ServiceResult<()> {
    match skeleton.items.iter().find(|item| !hydration.contains(item)) {
        Some(missing) => Err(ServiceError::internal(format!(
            "hydration left {missing} without an entry"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::no_rules;
    use graphview_core::{BoxFuture, EntityKind, EntityRef};
    use graphview_hydration::ListAggregate;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Calls(Mutex<Vec<&'static str>>);

    impl Calls {
        fn push(&self, stage: &'static str) {
            self.0.lock().push(stage);
        }

        fn take(&self) -> Vec<&'static str> {
            std::mem::take(&mut *self.0.lock())
        }
    }

    #[derive(Debug, Default)]
    struct App {
        calls: Calls,
        ids: Vec<&'static str>,
        present: Vec<&'static str>,
        delay: Option<Duration>,
    }

    struct Params;

    fn skeleton<'a>(
        input: SkeletonInput<'a, App, Params>,
    ) -> BoxFuture<'a, ServiceResult<SkeletonState>> {
        Box::pin(async move {
            input.app.calls.push("skeleton");
            if let Some(delay) = input.app.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(SkeletonState::of_kind(
                EntityKind::LIST_AGG,
                input.app.ids.iter().copied(),
                Some("next".to_string()),
            ))
        })
    }

    fn hydration<'a>(
        input: HydrationInput<'a, App, Params>,
    ) -> BoxFuture<'a, ServiceResult<HydrationState>> {
        Box::pin(async move {
            input.app.calls.push("hydration");
            let mut state = HydrationState::new();
            for id in input.skeleton.ids(EntityKind::LIST_AGG) {
                if input.app.present.contains(&id.as_str()) {
                    state.insert(id, ListAggregate { list_item_count: 1 });
                } else {
                    state.insert_absent(EntityRef::new(EntityKind::LIST_AGG, id));
                }
            }
            Ok(state)
        })
    }

    fn skip_hydration<'a>(
        _input: HydrationInput<'a, App, Params>,
    ) -> BoxFuture<'a, ServiceResult<HydrationState>> {
        Box::pin(async move { Ok(HydrationState::new()) })
    }

    fn rules(input: RulesInput<'_, App, Params>) {
        input.app.calls.push("rules");
        input
            .hydration
            .mark_invalid(&EntityRef::new(EntityKind::LIST_AGG, "b"));
    }

    fn identity_rules(_input: RulesInput<'_, App, Params>) {}

    fn adding_rules(input: RulesInput<'_, App, Params>) {
        input.hydration.insert("zz", ListAggregate { list_item_count: 9 });
    }

    fn reviving_rules(input: RulesInput<'_, App, Params>) {
        input.hydration.insert("b", ListAggregate { list_item_count: 9 });
    }

    fn replacing_rules(input: RulesInput<'_, App, Params>) {
        input.hydration.insert("a", ListAggregate { list_item_count: 1 });
    }

    fn removing_rules(input: RulesInput<'_, App, Params>) {
        input
            .hydration
            .remove(&EntityRef::new(EntityKind::LIST_AGG, "a"));
        input
            .hydration
            .mark_invalid(&EntityRef::new(EntityKind::LIST_AGG, "b"));
    }

    fn presentation(input: PresentationInput<'_, App, Params>) -> Vec<String> {
        input.app.calls.push("presentation");
        input
            .skeleton
            .ids(EntityKind::LIST_AGG)
            .into_iter()
            .filter(|id| input.hydration.record::<ListAggregate>(id).is_some())
            .collect()
    }

    fn doubling_presentation(input: PresentationInput<'_, App, Params>) -> Vec<String> {
        let ids = input.skeleton.ids(EntityKind::LIST_AGG);
        ids.iter().chain(ids.iter()).cloned().collect()
    }

    fn app(ids: &[&'static str], present: &[&'static str]) -> App {
        App {
            ids: ids.to_vec(),
            present: present.to_vec(),
            ..App::default()
        }
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let app = app(&["a", "b", "c"], &["a", "b", "c"]);
        let pipeline = Pipeline::new(skeleton, hydration, rules, presentation).named("test");

        let page = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect("pipeline should work");

        assert_eq!(
            app.calls.take(),
            vec!["skeleton", "hydration", "rules", "presentation"]
        );
        assert_eq!(page.items, vec!["a", "c"]);
        assert_eq!(page.cursor.as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn test_absent_ids_are_skipped_in_order() {
        let app = app(&["c", "a", "b"], &["c", "a"]);
        let pipeline = Pipeline::new(
            skeleton,
            hydration,
            no_rules::<App, Params>,
            presentation,
        );

        let page = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect("pipeline should work");
        assert_eq!(page.items, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_no_rules_matches_identity() {
        let app = app(&["a", "b"], &["a", "b"]);
        let request = RequestContext::mock();

        let with_no_rules = Pipeline::new(skeleton, hydration, no_rules::<App, Params>, presentation)
            .run(&app, Params, &request)
            .await
            .expect("pipeline should work");
        let with_identity = Pipeline::new(skeleton, hydration, identity_rules, presentation)
            .run(&app, Params, &request)
            .await
            .expect("pipeline should work");

        assert_eq!(with_no_rules, with_identity);
    }

    #[tokio::test]
    async fn test_missing_hydration_entry_is_internal() {
        let app = app(&["a"], &["a"]);
        let pipeline = Pipeline::new(
            skeleton,
            skip_hydration,
            no_rules::<App, Params>,
            presentation,
        );

        let error = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect_err("pipeline should fail");
        assert!(matches!(error, ServiceError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_rules_cannot_add_entries() {
        let app = app(&["a"], &["a"]);
        let pipeline = Pipeline::new(skeleton, hydration, adding_rules, presentation);

        let error = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect_err("pipeline should fail");
        assert!(matches!(error, ServiceError::Internal { .. }));
        assert!(error.to_string().contains("zz"));
    }

    #[tokio::test]
    async fn test_rules_cannot_revive_absent_entries() {
        let app = app(&["a", "b"], &["a"]);
        let pipeline = Pipeline::new(skeleton, hydration, reviving_rules, presentation);

        let error = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect_err("pipeline should fail");
        assert!(matches!(error, ServiceError::Internal { .. }));
        assert!(error.to_string().contains("revived"));
    }

    #[tokio::test]
    async fn test_rules_cannot_replace_records() {
        let app = app(&["a"], &["a"]);
        let pipeline = Pipeline::new(skeleton, hydration, replacing_rules, presentation);

        let error = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect_err("pipeline should fail");
        assert!(error.to_string().contains("replaced"));
    }

    #[tokio::test]
    async fn test_rules_may_remove_and_invalidate() {
        let app = app(&["a", "b", "c"], &["a", "b", "c"]);
        let pipeline = Pipeline::new(skeleton, hydration, removing_rules, presentation);

        let page = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect("pipeline should work");
        assert_eq!(page.items, vec!["c"]);
    }

    #[tokio::test]
    async fn test_presentation_cannot_render_extra_items() {
        let app = app(&["a", "b"], &["a", "b"]);
        let pipeline = Pipeline::new(
            skeleton,
            hydration,
            no_rules::<App, Params>,
            doubling_presentation,
        );

        let error = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect_err("pipeline should fail");
        assert!(matches!(error, ServiceError::Internal { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let mut app = app(&["a"], &["a"]);
        app.delay = Some(Duration::from_secs(10));
        let pipeline = Pipeline::new(skeleton, hydration, no_rules::<App, Params>, presentation)
            .with_timeout(Duration::from_secs(1));

        let error = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect_err("pipeline should time out");
        assert!(matches!(error, ServiceError::Timeout { .. }));
        assert_eq!(app.calls.take(), vec!["skeleton"]);
    }

    #[tokio::test]
    async fn test_empty_skeleton() {
        let app = app(&[], &[]);
        let pipeline = Pipeline::new(skeleton, hydration, no_rules::<App, Params>, presentation);

        let page = pipeline
            .run(&app, Params, &RequestContext::mock())
            .await
            .expect("pipeline should work");
        assert!(page.items.is_empty());
    }
}
