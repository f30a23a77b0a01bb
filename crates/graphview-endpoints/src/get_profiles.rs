//! `app.bsky.actor.getProfiles`: basic profiles for a set of actors.

use crate::context::AppContext;
use crate::output::XrpcOutput;
use crate::rules::moderation_rules;
use graphview_core::{BoxFuture, Did, EntityKind, RequestContext, ServiceError, ServiceResult};
use graphview_hydration::HydrationState;
use graphview_pipeline::{
    HydrationInput, Pipeline, PresentationInput, SkeletonInput, SkeletonState,
};
use graphview_views::ProfileViewBasic;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// XRPC method id.
pub const GET_PROFILES: &str = "app.bsky.actor.getProfiles";

/// Most actors one request may name.
pub const MAX_ACTORS: usize = 25;

/// Query parameters as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfilesParams {
    /// Actor DIDs, in the order the response should keep.
    pub actors: Vec<String>,
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfilesOutput {
    /// Visible profiles in request order, each actor once.
    pub profiles: Vec<ProfileViewBasic>,
}

#[derive(Debug)]
struct ProfilesQuery {
    actors: Vec<Did>,
}

impl ProfilesQuery {
    fn new(params: GetProfilesParams) -> ServiceResult<Self> {
        if params.actors.len() > MAX_ACTORS {
            return Err(ServiceError::invalid_request(format!(
                "actors: at most {MAX_ACTORS} allowed, got {}",
                params.actors.len()
            )));
        }
        let actors = params
            .actors
            .into_iter()
            .map(Did::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ServiceError::invalid_request(format!("actors: {err}")))?;
        Ok(Self { actors })
    }
}

/// Returns the basic profiles of `params.actors`.
///
/// Actors that do not exist, are taken down, or block the viewer are left
/// out. Repeated actors appear once, at their first position.
///
/// # Errors
///
/// - `InvalidRequest` when more than [`MAX_ACTORS`] actors are named or one
///   is not a DID
/// - `Unavailable` when the dataplane cannot be reached
/// - `Timeout` when the request deadline passes
pub async fn get_profiles(
    app: &AppContext,
    params: GetProfilesParams,
    ctx: &RequestContext,
) -> ServiceResult<XrpcOutput<GetProfilesOutput>> {
    let query = ProfilesQuery::new(params)?;
    let page = Pipeline::new(
        skeleton,
        hydration,
        moderation_rules::<AppContext, ProfilesQuery>,
        presentation,
    )
    .named(GET_PROFILES)
    .with_timeout(app.config.pipeline.request_timeout())
    .run(app, query, ctx)
    .await?;

    Ok(XrpcOutput::json(
        GetProfilesOutput {
            profiles: page.items,
        },
        ctx,
    ))
}

fn skeleton<'a>(
    input: SkeletonInput<'a, AppContext, ProfilesQuery>,
) -> BoxFuture<'a, ServiceResult<SkeletonState>> {
    let actors: IndexSet<&str> = input.params.actors.iter().map(Did::as_str).collect();
    let skeleton = SkeletonState::of_kind(EntityKind::ACTOR, actors, None);
    Box::pin(async move { Ok(skeleton) })
}

fn hydration<'a>(
    input: HydrationInput<'a, AppContext, ProfilesQuery>,
) -> BoxFuture<'a, ServiceResult<HydrationState>> {
    Box::pin(async move {
        let dids = input.skeleton.ids(EntityKind::ACTOR);
        Ok(input.app.hydrator.hydrate_profiles(&dids, input.request).await?)
    })
}

fn presentation(
    input: PresentationInput<'_, AppContext, ProfilesQuery>,
) -> Vec<ProfileViewBasic> {
    input
        .skeleton
        .items
        .iter()
        .filter(|item| item.kind == EntityKind::ACTOR)
        .filter_map(|item| {
            input
                .app
                .views
                .profile_basic(&item.id, input.hydration, input.request)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(actors: &[&str]) -> GetProfilesParams {
        GetProfilesParams {
            actors: actors.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_too_many_actors() {
        let actors: Vec<String> = (0..=MAX_ACTORS).map(|i| format!("did:plc:a{i}")).collect();
        let err = ProfilesQuery::new(GetProfilesParams { actors })
            .expect_err("26 actors should be rejected");
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));
    }

    #[test]
    fn test_exactly_max_actors_is_allowed() {
        let actors: Vec<String> = (0..MAX_ACTORS).map(|i| format!("did:plc:a{i}")).collect();
        let query = ProfilesQuery::new(GetProfilesParams { actors }).expect("25 actors should work");
        assert_eq!(query.actors.len(), MAX_ACTORS);
    }

    #[test]
    fn test_non_did_actor_is_invalid_request() {
        let err = ProfilesQuery::new(params(&["did:plc:alice", "bob.test"]))
            .expect_err("handle should be rejected");
        assert!(err.to_string().contains("bob.test"));
    }

    #[test]
    fn test_params_deserialize() {
        let params: GetProfilesParams =
            serde_json::from_str(r#"{"actors":["did:plc:alice","did:plc:bob"]}"#)
                .expect("deserialization should work");
        assert_eq!(params.actors.len(), 2);
    }
}
