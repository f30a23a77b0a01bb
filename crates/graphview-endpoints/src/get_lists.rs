//! `app.bsky.graph.getLists`: the lists an actor created.

use crate::context::{listing_failure, AppContext};
use crate::output::XrpcOutput;
use graphview_core::{BoxFuture, Did, EntityKind, RequestContext, ServiceError, ServiceResult};
use graphview_dataplane::{Dataplane, Listing, ListingQuery};
use graphview_hydration::HydrationState;
use graphview_pipeline::{
    clearly_bad_cursor, no_rules, HydrationInput, Limit, Pipeline, PresentationInput,
    SkeletonInput, SkeletonState,
};
use graphview_views::ListView;
use serde::{Deserialize, Serialize};

/// XRPC method id.
pub const GET_LISTS: &str = "app.bsky.graph.getLists";

/// Query parameters as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetListsParams {
    /// DID of the actor whose lists to return.
    pub actor: String,
    /// Requested page size.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Cursor from a previous page.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetListsOutput {
    /// Lists in listing order.
    pub lists: Vec<ListView>,
    /// Cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug)]
struct ListsQuery {
    actor: Did,
    limit: Limit,
    cursor: Option<String>,
}

impl ListsQuery {
    fn new(app: &AppContext, params: GetListsParams) -> ServiceResult<Self> {
        let actor = Did::parse(params.actor)
            .map_err(|err| ServiceError::invalid_request(format!("actor: {err}")))?;
        Ok(Self {
            actor,
            limit: app.limit(params.limit),
            cursor: params.cursor.filter(|c| !c.is_empty()),
        })
    }
}

/// Returns one page of the lists `params.actor` created.
///
/// # Errors
///
/// - `InvalidRequest` when `actor` is not a DID
/// - `Unavailable` when the listing or a whole hydration round fails to
///   reach the dataplane
/// - `Timeout` when the request deadline passes
pub async fn get_lists(
    app: &AppContext,
    params: GetListsParams,
    ctx: &RequestContext,
) -> ServiceResult<XrpcOutput<GetListsOutput>> {
    let query = ListsQuery::new(app, params)?;
    let page = Pipeline::new(
        skeleton,
        hydration,
        no_rules::<AppContext, ListsQuery>,
        presentation,
    )
    .named(GET_LISTS)
    .with_timeout(app.config.pipeline.request_timeout())
    .run(app, query, ctx)
    .await?;

    Ok(XrpcOutput::json(
        GetListsOutput {
            lists: page.items,
            cursor: page.cursor,
        },
        ctx,
    ))
}

fn skeleton<'a>(
    input: SkeletonInput<'a, AppContext, ListsQuery>,
) -> BoxFuture<'a, ServiceResult<SkeletonState>> {
    Box::pin(async move {
        let params = input.params;
        if clearly_bad_cursor(params.cursor.as_deref()) {
            tracing::debug!(cursor = ?params.cursor, "ignoring legacy cursor");
            return Ok(SkeletonState::empty());
        }

        let page = input
            .app
            .dataplane
            .list_ids(ListingQuery {
                listing: Listing::ACTOR_LISTS,
                owner: params.actor.to_string(),
                cursor: params.cursor.clone(),
                limit: params.limit.get(),
            })
            .await
            .map_err(listing_failure)?;

        Ok(SkeletonState::of_kind(EntityKind::LIST, page.ids, page.cursor))
    })
}

fn hydration<'a>(
    input: HydrationInput<'a, AppContext, ListsQuery>,
) -> BoxFuture<'a, ServiceResult<HydrationState>> {
    Box::pin(async move {
        let uris = input.skeleton.ids(EntityKind::LIST);
        Ok(input.app.hydrator.hydrate_lists(&uris, input.request).await?)
    })
}

fn presentation(input: PresentationInput<'_, AppContext, ListsQuery>) -> Vec<ListView> {
    input
        .skeleton
        .items
        .iter()
        .filter(|item| item.kind == EntityKind::LIST)
        .filter_map(|item| input.app.views.list(&item.id, input.hydration, input.request))
        .collect()
}
