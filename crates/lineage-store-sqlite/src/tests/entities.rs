use lineage_core::{
  Error, FamilyTree, PersonFilter,
  model::{
    Event, EventPatch, EventType, MediaCategory, NewMedia, Organization, Person,
    PersonPatch, Place,
  },
  patch::Patch,
};

use super::{person, some, tree};
use crate::SqliteStore;

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_person() {
  let t = tree().await;
  let created = t
    .create_person(Person {
      birth_date: some("circa 1890"),
      ..Person::named("Ada Byron")
    })
    .await
    .unwrap();

  let fetched = t.get_person(created.id).await.unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.props.birth_date.as_deref(), Some("circa 1890"));
  assert_eq!(fetched.props.death_date, None);
}

#[tokio::test]
async fn empty_string_is_distinct_from_absent() {
  let t = tree().await;
  let id = t
    .create_person(Person { bio: some(""), ..Person::named("Ada") })
    .await
    .unwrap()
    .id;
  let fetched = t.get_person(id).await.unwrap();
  assert_eq!(fetched.props.bio.as_deref(), Some(""));
  assert_eq!(fetched.props.gender, None);
}

#[tokio::test]
async fn ids_are_monotonic_and_never_reused() {
  let t = tree().await;
  let a = person(&t, "A").await;
  let b = person(&t, "B").await;
  assert!(b > a);

  t.delete_person(b).await.unwrap();
  let c = person(&t, "C").await;
  assert!(c > b);
}

#[tokio::test]
async fn ids_are_allocated_per_kind() {
  let t = tree().await;
  let p = person(&t, "A").await;
  let place = t.create(Place { name: "Dayton".into(), ..Place::default() }).await.unwrap();
  assert_eq!(p, 1);
  assert_eq!(place.id, 1);
}

#[tokio::test]
async fn get_missing_person_is_not_found() {
  let t = tree().await;
  let err = t.get_person(42).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { id: 42, .. }));
  assert!(err.is_not_found());
}

#[tokio::test]
async fn update_overwrites_only_supplied_fields() {
  let t = tree().await;
  let id = t
    .create_person(Person {
      birth_date: some("1890"),
      death_date: some("1950"),
      ..Person::named("Ada")
    })
    .await
    .unwrap()
    .id;

  let patch = PersonPatch {
    bio: Patch::Set("Weaver".into()),
    death_date: Patch::Clear,
    ..PersonPatch::default()
  };
  let updated = t.update_person(id, patch).await.unwrap();

  assert_eq!(updated.props.name, "Ada");
  assert_eq!(updated.props.birth_date.as_deref(), Some("1890"));
  assert_eq!(updated.props.death_date, None);
  assert_eq!(updated.props.bio.as_deref(), Some("Weaver"));
  assert_eq!(t.get_person(id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_missing_person_is_not_found() {
  let t = tree().await;
  let err = t.update_person(7, PersonPatch::default()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { id: 7, .. }));
}

#[tokio::test]
async fn delete_missing_person_succeeds() {
  let t = tree().await;
  t.delete_person(99).await.unwrap();
}

async fn seed_people(t: &FamilyTree<SqliteStore>) {
  let people = [
    Person {
      birth_date: some("1890-04-02"),
      birth_place: some("Dayton, Ohio"),
      death_date: some("1950"),
      ..Person::named("Ada Byron")
    },
    Person {
      birth_date: some("1921"),
      death_place: some("Columbus, Ohio"),
      ..Person::named("Ben Byron")
    },
    Person {
      birth_date: some("1894"),
      birth_place: some("Leeds"),
      ..Person::named("Cora Lane")
    },
  ];
  for p in people {
    t.create_person(p).await.unwrap();
  }
}

fn names(people: &[lineage_core::entity::Node<Person>]) -> Vec<&str> {
  people.iter().map(|p| p.props.name.as_str()).collect()
}

#[tokio::test]
async fn list_people_filters() {
  let t = tree().await;
  seed_people(&t).await;

  let all = t.list_people(PersonFilter::default()).await.unwrap();
  assert_eq!(names(&all), ["Ada Byron", "Ben Byron", "Cora Lane"]);

  let by_name = PersonFilter { name: some("byron"), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(by_name).await.unwrap()), ["Ada Byron", "Ben Byron"]);

  let by_year = PersonFilter { birth_year: some("189"), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(by_year).await.unwrap()), ["Ada Byron", "Cora Lane"]);

  let by_place = PersonFilter { location: some("ohio"), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(by_place).await.unwrap()), ["Ada Byron", "Ben Byron"]);

  let alive = PersonFilter { alive: Some(true), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(alive).await.unwrap()), ["Ben Byron", "Cora Lane"]);

  let dead = PersonFilter { alive: Some(false), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(dead).await.unwrap()), ["Ada Byron"]);

  let combined = PersonFilter {
    name: some("Byron"),
    alive: Some(true),
    ..PersonFilter::default()
  };
  assert_eq!(names(&t.list_people(combined).await.unwrap()), ["Ben Byron"]);
}

#[tokio::test]
async fn list_people_pages() {
  let t = tree().await;
  seed_people(&t).await;

  let page = PersonFilter { limit: Some(1), offset: Some(1), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(page).await.unwrap()), ["Ben Byron"]);

  let capped = FamilyTree::new(t.store().clone()).with_list_limit(2);
  assert_eq!(capped.list_people(PersonFilter::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn like_wildcards_match_literally() {
  let t = tree().await;
  t.create_person(Person::named("100% Smith")).await.unwrap();
  t.create_person(Person::named("Jones")).await.unwrap();

  let filter = PersonFilter { name: some("%"), ..PersonFilter::default() };
  assert_eq!(names(&t.list_people(filter).await.unwrap()), ["100% Smith"]);
}

// ─── Places & organizations ──────────────────────────────────────────────────

#[tokio::test]
async fn place_search_spans_name_city_and_state() {
  let t = tree().await;
  for (name, city, state) in [
    ("Old Farm", Some("Xenia"), Some("Ohio")),
    ("Mill House", Some("Dayton"), None),
    ("Harbour", None, Some("Maine")),
  ] {
    t.create(Place {
      name: name.into(),
      city: city.map(Into::into),
      state: state.map(Into::into),
      ..Place::default()
    })
    .await
    .unwrap();
  }

  assert_eq!(t.list_places(None).await.unwrap().len(), 3);
  let hits = t.list_places(some("o")).await.unwrap();
  assert_eq!(hits.len(), 3);
  let hits = t.list_places(some("dayton")).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].props.name, "Mill House");
  let hits = t.list_places(some("maine")).await.unwrap();
  assert_eq!(hits[0].props.name, "Harbour");
}

#[tokio::test]
async fn place_coordinates_round_trip() {
  let t = tree().await;
  let place = t
    .create(Place {
      name: "Dayton".into(),
      geo_lat: Some(39.7589),
      geo_lng: Some(-84.1916),
      ..Place::default()
    })
    .await
    .unwrap();
  let fetched = t.get::<Place>(place.id).await.unwrap();
  assert_eq!(fetched.props.geo_lat, Some(39.7589));
  assert_eq!(fetched.props.geo_lng, Some(-84.1916));
}

#[tokio::test]
async fn organization_search_and_update() {
  let t = tree().await;
  let org = t
    .create(Organization {
      name: "Wright Cycle Co".into(),
      category: some("company"),
      location: None,
    })
    .await
    .unwrap();
  t.create(Organization { name: "US Army".into(), ..Organization::default() })
    .await
    .unwrap();

  let hits = t.list_organizations(some("cycle")).await.unwrap();
  assert_eq!(hits, vec![org.clone()]);

  let patch = lineage_core::model::OrganizationPatch {
    location: Patch::Set("Dayton".into()),
    ..Default::default()
  };
  let updated = t.update::<Organization>(org.id, patch).await.unwrap();
  assert_eq!(updated.props.category.as_deref(), Some("company"));
  assert_eq!(updated.props.location.as_deref(), Some("Dayton"));
}

#[tokio::test]
async fn places_and_organizations_list_by_name() {
  let t = tree().await;
  for name in ["Zeta", "Alpha", "Mill"] {
    t.create(Place { name: name.into(), ..Place::default() }).await.unwrap();
  }
  for name in ["Zed Mill", "Acme"] {
    t.create(Organization { name: name.into(), ..Organization::default() })
      .await
      .unwrap();
  }

  let places: Vec<_> = t
    .list_places(None)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.props.name)
    .collect();
  assert_eq!(places, ["Alpha", "Mill", "Zeta"]);

  let orgs: Vec<_> = t
    .list_organizations(None)
    .await
    .unwrap()
    .into_iter()
    .map(|o| o.props.name)
    .collect();
  assert_eq!(orgs, ["Acme", "Zed Mill"]);

  let mills: Vec<_> = t
    .list_organizations(some("mill"))
    .await
    .unwrap()
    .into_iter()
    .map(|o| o.props.name)
    .collect();
  assert_eq!(mills, ["Zed Mill"]);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn event_types_are_closed() {
  let t = tree().await;
  let types = t.event_types();
  assert_eq!(types.len(), 6);
  assert!(types.contains(&EventType::MilitaryService));
}

#[tokio::test]
async fn list_events_by_type_latest_first() {
  let t = tree().await;
  for (ty, date) in [
    (EventType::Award, Some("1950")),
    (EventType::Graduation, Some("1912")),
    (EventType::Award, None),
    (EventType::Award, Some("1961")),
  ] {
    t.create_event(Event { event_date: date.map(Into::into), ..Event::new(ty) }, &[])
      .await
      .unwrap();
  }

  let awards = t.list_events(Some(EventType::Award)).await.unwrap();
  let dates: Vec<_> = awards.iter().map(|e| e.props.event_date.as_deref()).collect();
  assert_eq!(dates, [Some("1961"), Some("1950"), None]);
  assert_eq!(t.list_events(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn event_type_can_be_changed() {
  let t = tree().await;
  let ev = t.create_event(Event::new(EventType::Other), &[]).await.unwrap();
  let patch = EventPatch {
    event_type: Some(EventType::Retirement),
    description: Patch::Set("Left the shop".into()),
    ..EventPatch::default()
  };
  let updated = t.update::<Event>(ev.id, patch).await.unwrap();
  assert_eq!(updated.props.event_type, EventType::Retirement);
  assert!(t.list_events(Some(EventType::Other)).await.unwrap().is_empty());
}

// ─── Media ───────────────────────────────────────────────────────────────────

fn upload(filename: &str, content_type: &str) -> NewMedia {
  NewMedia {
    filename:     filename.into(),
    file_path:    format!("media/{filename}"),
    content_type: content_type.into(),
    caption:      None,
  }
}

#[tokio::test]
async fn media_category_and_upload_date_are_derived() {
  let t = tree().await;
  let photo = t.create_media(upload("wedding.jpg", "image/jpeg")).await.unwrap();
  assert_eq!(photo.props.category, MediaCategory::Image);
  assert_eq!(photo.props.upload_date.len(), "2024-01-01".len());
  assert_eq!(photo.props.upload_date.as_bytes()[4], b'-');

  let deed = t.create_media(upload("deed.pdf", "application/pdf")).await.unwrap();
  assert_eq!(deed.props.category, MediaCategory::Document);

  let docs = t.list_media(Some(MediaCategory::Document)).await.unwrap();
  assert_eq!(docs, vec![deed]);
  assert_eq!(t.list_media(None).await.unwrap().len(), 2);
  assert!(t.list_media(Some(MediaCategory::Video)).await.unwrap().is_empty());
}

// ─── Durability ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn graph_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("lineage.db");

  let (parent, child) = {
    let t = FamilyTree::new(SqliteStore::open(&path).await.unwrap());
    let parent = person(&t, "Parent").await;
    let child = person(&t, "Child").await;
    t.add_parent_child(parent, child, lineage_core::edge::ParentKind::Biological, None)
      .await
      .unwrap();
    (parent, child)
  };

  let t = FamilyTree::new(SqliteStore::open(&path).await.unwrap());
  assert_eq!(t.get_person(child).await.unwrap().props.name, "Child");
  let parents = t.parents_of(child).await.unwrap();
  assert_eq!(parents.len(), 1);
  assert_eq!(parents[0].person.id, parent);
  assert!(person(&t, "Next").await > child);
}
