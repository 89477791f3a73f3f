//! Consistency rules, driven through the command surface.

use lineage_core::{
  Error,
  edge::{EdgeKind, ParentKind},
  model::{Event, EventType, NewMedia, Occupation, Organization, Place},
  patch::Patch,
  store::{GraphSession, GraphStore},
};

use super::{person, some, tree};

// ─── Parentage ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn parent_child_is_visible_from_both_ends() {
  let t = tree().await;
  let a = person(&t, "Parent").await;
  let b = person(&t, "Child").await;
  t.add_parent_child(a, b, ParentKind::Biological, None).await.unwrap();

  let parents = t.parents_of(b).await.unwrap();
  assert_eq!(parents.len(), 1);
  assert_eq!(parents[0].person.id, a);
  assert_eq!(parents[0].relationship_type, ParentKind::Biological);

  let children = t.children_of(a).await.unwrap();
  assert_eq!(children.len(), 1);
  assert_eq!(children[0].person.id, b);
}

#[tokio::test]
async fn self_parent_is_rejected() {
  let t = tree().await;
  let a = person(&t, "A").await;
  for kind in [ParentKind::Biological, ParentKind::Adopted] {
    let err = t.add_parent_child(a, a, kind, None).await.unwrap_err();
    assert!(matches!(err, Error::SelfReference { id, .. } if id == a));
  }
}

#[tokio::test]
async fn parent_to_missing_person_is_endpoint_not_found() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let err = t
    .add_parent_child(a, 404, ParentKind::Biological, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EndpointNotFound { id: 404, .. }));
}

#[tokio::test]
async fn same_kind_twice_is_a_no_op() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  t.add_parent_child(a, b, ParentKind::Biological, None).await.unwrap();
  t.add_parent_child(a, b, ParentKind::Biological, None).await.unwrap();
  assert_eq!(t.parents_of(b).await.unwrap().len(), 1);
}

#[tokio::test]
async fn opposite_kind_conflicts_until_changed() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  t.add_parent_child(a, b, ParentKind::Biological, None).await.unwrap();

  let err = t
    .add_parent_child(a, b, ParentKind::Adopted, some("1920"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  t.change_parent_child_kind(a, b, ParentKind::Adopted, some("1920"))
    .await
    .unwrap();

  let parents = t.parents_of(b).await.unwrap();
  assert_eq!(parents.len(), 1);
  assert_eq!(parents[0].relationship_type, ParentKind::Adopted);
  assert_eq!(parents[0].adoption_date.as_deref(), Some("1920"));
}

#[tokio::test]
async fn changing_back_to_biological_drops_adoption_date() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  t.add_parent_child(a, b, ParentKind::Adopted, some("1920")).await.unwrap();
  t.change_parent_child_kind(a, b, ParentKind::Biological, some("1920"))
    .await
    .unwrap();

  let parents = t.parents_of(b).await.unwrap();
  assert_eq!(parents[0].relationship_type, ParentKind::Biological);
  assert_eq!(parents[0].adoption_date, None);
}

#[tokio::test]
async fn change_to_same_kind_updates_in_place() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  t.add_parent_child(a, b, ParentKind::Adopted, some("1920")).await.unwrap();

  let before = t.store().session().await.unwrap().edges(EdgeKind::AdoptedBy).await.unwrap();
  t.change_parent_child_kind(a, b, ParentKind::Adopted, some("1921"))
    .await
    .unwrap();
  let after = t.store().session().await.unwrap().edges(EdgeKind::AdoptedBy).await.unwrap();

  assert_eq!(after.len(), 1);
  assert_eq!(after[0].edge_id, before[0].edge_id);
  assert_eq!(after[0].props.adoption_date.as_deref(), Some("1921"));
}

#[tokio::test]
async fn change_without_link_is_not_found() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  let err = t
    .change_parent_child_kind(a, b, ParentKind::Adopted, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EdgeNotFound { .. }));
  assert!(err.is_not_found());
}

#[tokio::test]
async fn remove_parent_child_is_idempotent() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  t.remove_parent_child(a, b).await.unwrap();

  t.add_parent_child(a, b, ParentKind::Adopted, None).await.unwrap();
  t.remove_parent_child(a, b).await.unwrap();
  assert!(t.parents_of(b).await.unwrap().is_empty());
  t.remove_parent_child(a, b).await.unwrap();
}

// ─── Marriage ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn spouses_are_undirected() {
  let t = tree().await;
  let x = person(&t, "X").await;
  let y = person(&t, "Y").await;
  t.add_spouse(x, y, some("1990"), some("2000")).await.unwrap();

  let of_x = t.spouses_of(x).await.unwrap();
  let of_y = t.spouses_of(y).await.unwrap();
  assert_eq!(of_x.len(), 1);
  assert_eq!(of_y.len(), 1);
  assert_eq!(of_x[0].person.id, y);
  assert_eq!(of_y[0].person.id, x);
  for link in [&of_x[0], &of_y[0]] {
    assert_eq!(link.start_date.as_deref(), Some("1990"));
    assert_eq!(link.end_date.as_deref(), Some("2000"));
  }

  t.remove_spouse(y, x).await.unwrap();
  assert!(t.spouses_of(x).await.unwrap().is_empty());
  assert!(t.spouses_of(y).await.unwrap().is_empty());
  t.remove_spouse(x, y).await.unwrap();
}

#[tokio::test]
async fn self_marriage_is_rejected() {
  let t = tree().await;
  let x = person(&t, "X").await;
  let err = t.add_spouse(x, x, None, None).await.unwrap_err();
  assert!(matches!(err, Error::SelfReference { kind: EdgeKind::MarriedTo, .. }));
}

#[tokio::test]
async fn omitted_marriage_dates_are_not_written() {
  let t = tree().await;
  let x = person(&t, "X").await;
  let y = person(&t, "Y").await;
  t.add_spouse(x, y, some("1990"), None).await.unwrap();

  let edges = t.store().session().await.unwrap().edges(EdgeKind::MarriedTo).await.unwrap();
  assert_eq!(edges[0].props.start_date.as_deref(), Some("1990"));
  assert_eq!(edges[0].props.end_date, None);
}

#[tokio::test]
async fn update_spouse_patches_the_latest_marriage() {
  let t = tree().await;
  let x = person(&t, "X").await;
  let y = person(&t, "Y").await;
  t.add_spouse(x, y, some("1990"), some("1995")).await.unwrap();
  t.add_spouse(y, x, some("2001"), None).await.unwrap();

  t.update_spouse(x, y, Patch::Keep, Patch::Set("2010".into()))
    .await
    .unwrap();

  let spouses = t.spouses_of(x).await.unwrap();
  assert_eq!(spouses.len(), 2);
  assert_eq!(spouses[0].end_date.as_deref(), Some("1995"));
  assert_eq!(spouses[1].start_date.as_deref(), Some("2001"));
  assert_eq!(spouses[1].end_date.as_deref(), Some("2010"));

  t.update_spouse(y, x, Patch::Clear, Patch::Keep).await.unwrap();
  let spouses = t.spouses_of(y).await.unwrap();
  assert_eq!(spouses[1].start_date, None);
  assert_eq!(spouses[1].end_date.as_deref(), Some("2010"));
}

#[tokio::test]
async fn update_spouse_without_marriage_is_not_found() {
  let t = tree().await;
  let x = person(&t, "X").await;
  let y = person(&t, "Y").await;
  let err = t
    .update_spouse(x, y, Patch::Set("1990".into()), Patch::Keep)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EdgeNotFound { kind: EdgeKind::MarriedTo, .. }));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn participants_are_unique_per_event() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  let ev = t.create_event(Event::new(EventType::Graduation), &[a]).await.unwrap();

  let err = t.add_participant(ev.id, a, some("graduate")).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  t.add_participant(ev.id, b, some("guest")).await.unwrap();
  let detail = t.event_detail(ev.id).await.unwrap();
  let ids: Vec<_> = detail.participants.iter().map(|p| p.id).collect();
  assert_eq!(ids, [a, b]);
  assert_eq!(detail.participants[1].role.as_deref(), Some("guest"));

  t.remove_participant(ev.id, a).await.unwrap();
  t.remove_participant(ev.id, a).await.unwrap();
  assert_eq!(t.event_detail(ev.id).await.unwrap().participants.len(), 1);
}

#[tokio::test]
async fn create_event_keeps_partial_participants_on_failure() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let err = t
    .create_event(Event::new(EventType::Award), &[a, 404, a])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EndpointNotFound { id: 404, .. }));

  let events = t.list_events(None).await.unwrap();
  assert_eq!(events.len(), 1);
  let detail = t.event_detail(events[0].id).await.unwrap();
  assert_eq!(detail.participants.len(), 1);
  assert_eq!(detail.participants[0].id, a);
}

// ─── Places ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn residences_can_be_added_and_removed() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let place = t.create(Place { name: "Dayton".into(), ..Place::default() }).await.unwrap();

  t.add_residence(place.id, a, some("1900"), some("1910"), some("owned"))
    .await
    .unwrap();
  t.add_residence(place.id, a, some("1920"), None, None).await.unwrap();
  assert_eq!(t.person_residences(a).await.unwrap().len(), 2);

  t.remove_residence(place.id, a).await.unwrap();
  assert!(t.person_residences(a).await.unwrap().is_empty());
  t.remove_residence(place.id, a).await.unwrap();
}

// ─── Occupations ─────────────────────────────────────────────────────────────

fn job(title: &str) -> Occupation {
  Occupation { title: title.into(), ..Occupation::default() }
}

#[tokio::test]
async fn occupation_requires_an_existing_person() {
  let t = tree().await;
  let err = t.create_occupation(404, job("Clerk"), None).await.unwrap_err();
  assert!(matches!(err, Error::EndpointNotFound { id: 404, .. }));
  assert!(t.list_occupations().await.unwrap().is_empty());
}

#[tokio::test]
async fn occupation_with_missing_organization_is_kept() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let err = t.create_occupation(a, job("Clerk"), Some(404)).await.unwrap_err();
  assert!(matches!(err, Error::EndpointNotFound { id: 404, .. }));

  let held = t.person_occupations(a).await.unwrap();
  assert_eq!(held.len(), 1);
  assert!(held[0].organization.is_none());
}

#[tokio::test]
async fn occupation_has_at_most_one_employer() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let first = t
    .create(Organization { name: "Mill".into(), ..Organization::default() })
    .await
    .unwrap();
  let second = t
    .create(Organization { name: "Bank".into(), ..Organization::default() })
    .await
    .unwrap();
  let occ = t.create_occupation(a, job("Clerk"), Some(first.id)).await.unwrap();

  t.link_occupation_organization(occ.id, first.id).await.unwrap();
  let err = t
    .link_occupation_organization(occ.id, second.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  t.unlink_occupation_organization(occ.id, first.id).await.unwrap();
  t.unlink_occupation_organization(occ.id, first.id).await.unwrap();
  t.link_occupation_organization(occ.id, second.id).await.unwrap();

  let detail = t.occupation_detail(occ.id).await.unwrap();
  assert_eq!(detail.organization.map(|o| o.id), Some(second.id));
}

// ─── Media ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn media_link_is_idempotent() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let media = t
    .create_media(NewMedia {
      filename:     "portrait.png".into(),
      file_path:    "media/portrait.png".into(),
      content_type: "image/png".into(),
      caption:      some("Studio portrait"),
    })
    .await
    .unwrap();

  t.link_media_person(media.id, a).await.unwrap();
  t.link_media_person(media.id, a).await.unwrap();
  assert_eq!(t.person_media(a).await.unwrap(), vec![media.clone()]);

  t.unlink_media_person(media.id, a).await.unwrap();
  assert!(t.person_media(a).await.unwrap().is_empty());
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_a_person_leaves_no_edges_behind() {
  let t = tree().await;
  let parent = person(&t, "Parent").await;
  let p = person(&t, "P").await;
  let spouse = person(&t, "Spouse").await;
  let place = t.create(Place { name: "Dayton".into(), ..Place::default() }).await.unwrap();

  t.add_parent_child(parent, p, ParentKind::Biological, None).await.unwrap();
  t.add_spouse(p, spouse, some("1990"), None).await.unwrap();
  t.add_residence(place.id, p, some("1990"), None, None).await.unwrap();

  t.delete_person(p).await.unwrap();

  assert!(t.children_of(parent).await.unwrap().is_empty());
  assert!(t.spouses_of(spouse).await.unwrap().is_empty());
  assert!(t.place_detail(place.id).await.unwrap().residents.is_empty());
  assert!(t.parents_of(p).await.unwrap().is_empty());

  let mut s = t.store().session().await.unwrap();
  for kind in [
    EdgeKind::ParentOf,
    EdgeKind::AdoptedBy,
    EdgeKind::MarriedTo,
    EdgeKind::ParticipatedIn,
    EdgeKind::LivedAt,
    EdgeKind::HasMedia,
    EdgeKind::WorkedAs,
  ] {
    assert!(s.edges_from(kind, p).await.unwrap().is_empty(), "{kind} from");
    if kind.target() == lineage_core::entity::EntityKind::Person {
      assert!(s.edges_to(kind, p).await.unwrap().is_empty(), "{kind} to");
    }
  }
}

#[tokio::test]
async fn deleting_an_organization_unlinks_occupations() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let org = t
    .create(Organization { name: "Mill".into(), ..Organization::default() })
    .await
    .unwrap();
  let occ = t.create_occupation(a, job("Clerk"), Some(org.id)).await.unwrap();

  t.delete::<Organization>(org.id).await.unwrap();
  let detail = t.occupation_detail(occ.id).await.unwrap();
  assert!(detail.organization.is_none());
  assert_eq!(t.person_occupations(a).await.unwrap().len(), 1);
}
