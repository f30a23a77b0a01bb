//! Seed data for tests.
//!
//! [`social_graph`] builds a small, fixed graph:
//!
//! | Actor | Notes |
//! |-------|-------|
//! | alice | owns lists `1`, `2`, `3`; carol follows her and mutes list `1` |
//! | bob | blocks carol; owns list `hidden`, which is taken down |
//! | carol | the usual viewer |
//! | mallory | `!takedown` by the moderator, `spam` by the community labeler; owns list `1` |

use graphview_core::{Did, EntityKind};
use graphview_dataplane::{Listing, MemoryDataplane};
use serde_json::{json, Value};

/// Owner of three curation lists.
pub const ALICE: &str = "did:plc:alice";
/// Blocks carol.
pub const BOB: &str = "did:plc:bob";
/// A viewer.
pub const CAROL: &str = "did:plc:carol";
/// Labeled by both labelers.
pub const MALLORY: &str = "did:plc:mallory";
/// A labeler that issues takedowns.
pub const MODERATOR: &str = "did:plc:moderator";
/// A labeler that issues informational labels.
pub const COMMUNITY: &str = "did:plc:community";

/// Curation list purpose.
pub const CURATELIST: &str = "app.bsky.graph.defs#curatelist";

/// Returns the AT-URI of a list record.
pub fn list_uri(owner: &str, rkey: &str) -> String {
    format!("at://{owner}/app.bsky.graph.list/{rkey}")
}

/// An actor record.
pub fn actor(did: &str, handle: &str) -> Value {
    json!({
        "did": did,
        "handle": handle,
        "displayName": handle.split('.').next().unwrap_or(handle),
        "indexedAt": "2024-01-01T00:00:00.000Z",
    })
}

/// A list record.
pub fn list(owner: &str, rkey: &str, name: &str) -> Value {
    json!({
        "uri": list_uri(owner, rkey),
        "cid": format!("bafy{rkey}"),
        "creator": owner,
        "name": name,
        "purpose": CURATELIST,
        "indexedAt": "2024-01-02T00:00:00.000Z",
    })
}

/// A label set with one label per `(src, val)` pair.
pub fn labels(subject: &str, issued: &[(&str, &str)]) -> Value {
    let labels: Vec<Value> = issued
        .iter()
        .map(|(src, val)| json!({"src": src, "uri": subject, "val": val}))
        .collect();
    json!({ "labels": labels })
}

/// Stores an actor record.
pub fn seed_actor(dp: &MemoryDataplane, did: &str, handle: &str) {
    dp.put(EntityKind::ACTOR, did, actor(did, handle));
}

/// Stores a list with its aggregate and appends it to the owner's listing.
pub fn seed_list(dp: &MemoryDataplane, owner: &str, rkey: &str, name: &str, members: u64) {
    let uri = list_uri(owner, rkey);
    dp.put(EntityKind::LIST, uri.clone(), list(owner, rkey, name));
    dp.put(EntityKind::LIST_AGG, uri.clone(), json!({ "listItemCount": members }));
    dp.push_listing(Listing::ACTOR_LISTS, owner, uri);
}

/// Parses a fixture DID.
pub fn did(value: &str) -> Did {
    match Did::parse(value) {
        Ok(did) => did,
        Err(err) => panic!("fixture DID {value} is invalid: {err}"),
    }
}

/// Builds the fixed test graph.
pub fn social_graph() -> MemoryDataplane {
    let dp = MemoryDataplane::new();

    seed_actor(&dp, ALICE, "alice.test");
    seed_actor(&dp, BOB, "bob.test");
    seed_actor(&dp, CAROL, "carol.test");
    seed_actor(&dp, MALLORY, "mallory.test");

    seed_list(&dp, ALICE, "1", "Friends", 12);
    seed_list(&dp, ALICE, "2", "Artists", 40);
    seed_list(&dp, ALICE, "3", "Mutuals", 7);
    seed_list(&dp, MALLORY, "1", "Totally Legit", 999);

    seed_list(&dp, BOB, "hidden", "Hidden", 1);
    let mut hidden = list(BOB, "hidden", "Hidden");
    hidden["takedownRef"] = json!("mod-action:1");
    dp.put(EntityKind::LIST, list_uri(BOB, "hidden"), hidden);

    dp.put(
        EntityKind::LABELS,
        MALLORY,
        labels(MALLORY, &[(MODERATOR, "!takedown"), (COMMUNITY, "spam")]),
    );
    dp.put(
        EntityKind::LABELS,
        list_uri(ALICE, "2"),
        labels(&list_uri(ALICE, "2"), &[(COMMUNITY, "art")]),
    );

    let carol = did(CAROL);
    dp.put_for_viewer(EntityKind::ACTOR_VIEWER, &carol, BOB, json!({ "blockedBy": true }));
    dp.put_for_viewer(
        EntityKind::ACTOR_VIEWER,
        &carol,
        ALICE,
        json!({ "following": format!("at://{CAROL}/app.bsky.graph.follow/1") }),
    );
    dp.put_for_viewer(
        EntityKind::LIST_VIEWER,
        &carol,
        list_uri(ALICE, "1"),
        json!({ "muted": true }),
    );

    dp
}
