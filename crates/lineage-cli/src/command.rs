//! Subcommands and their dispatch onto [`FamilyTree`].
//!
//! Property records are passed as JSON bodies (`--json '{"name": "Ada"}'`);
//! in update bodies a missing key leaves the field alone and `null` clears
//! it. Every command prints a single JSON document.

use anyhow::Context as _;
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use lineage_core::{
  FamilyTree, PersonFilter,
  edge::ParentKind,
  entity::{Entity, Id},
  model::{
    Event, EventType, Media, MediaCategory, NewMedia, Occupation, Organization,
    Person, Place,
  },
  patch::Patch,
  store::GraphStore,
};

// ─── Argument types ──────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// People and person-centred queries.
  #[command(subcommand)]
  Person(PersonCommand),
  /// Parent/child links.
  #[command(subcommand)]
  Parent(ParentCommand),
  /// Marriages.
  #[command(subcommand)]
  Spouse(SpouseCommand),
  /// Dump every person and family edge.
  Graph,
  #[command(subcommand)]
  Place(PlaceCommand),
  #[command(subcommand)]
  Org(OrgCommand),
  #[command(subcommand)]
  Event(EventCommand),
  #[command(subcommand)]
  Occupation(OccupationCommand),
  #[command(subcommand)]
  Media(MediaCommand),
}

/// Update and delete, shared by every entity kind.
#[derive(Subcommand, Debug)]
pub enum Edit {
  /// Partially update an entity from a JSON body.
  Update {
    id:   Id,
    #[arg(long)]
    json: String,
  },
  /// Delete an entity and every relationship touching it.
  Delete { id: Id },
}

#[derive(Args, Debug)]
pub struct Body {
  /// JSON property record.
  #[arg(long)]
  pub json: String,
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
  Create(Body),
  Get { id: Id },
  #[command(flatten)]
  Edit(Edit),
  List {
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    birth_year: Option<String>,
    #[arg(long)]
    location:   Option<String>,
    #[arg(long)]
    alive:      Option<bool>,
    #[arg(long)]
    limit:      Option<usize>,
    #[arg(long)]
    offset:     Option<usize>,
  },
  /// Parents, children, spouses and siblings.
  Relationships { id: Id },
  Ancestors {
    id:    Id,
    #[arg(long)]
    depth: Option<usize>,
  },
  Descendants {
    id:    Id,
    #[arg(long)]
    depth: Option<usize>,
  },
  Events { id: Id },
  Residences { id: Id },
  Occupations { id: Id },
  Media { id: Id },
}

#[derive(Subcommand, Debug)]
pub enum ParentCommand {
  Add {
    parent:        Id,
    child:         Id,
    #[arg(long, default_value = "biological")]
    kind:          ParentKind,
    #[arg(long)]
    adoption_date: Option<String>,
  },
  /// Switch an existing link between biological and adopted.
  Change {
    parent:        Id,
    child:         Id,
    #[arg(long)]
    kind:          ParentKind,
    #[arg(long)]
    adoption_date: Option<String>,
  },
  Remove { parent: Id, child: Id },
}

#[derive(Subcommand, Debug)]
pub enum SpouseCommand {
  Add {
    a:     Id,
    b:     Id,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end:   Option<String>,
  },
  /// Patch the dates of the latest marriage from a JSON body
  /// (`{"start_date": ..., "end_date": ...}`).
  Update {
    a:    Id,
    b:    Id,
    #[arg(long)]
    json: String,
  },
  Remove { a: Id, b: Id },
}

#[derive(Subcommand, Debug)]
pub enum PlaceCommand {
  Create(Body),
  /// A place with its residents.
  Get { id: Id },
  #[command(flatten)]
  Edit(Edit),
  List {
    #[arg(long)]
    search: Option<String>,
  },
  AddResident {
    place:          Id,
    person:         Id,
    #[arg(long)]
    start:          Option<String>,
    #[arg(long)]
    end:            Option<String>,
    #[arg(long)]
    residence_type: Option<String>,
  },
  RemoveResident { place: Id, person: Id },
}

#[derive(Subcommand, Debug)]
pub enum OrgCommand {
  Create(Body),
  /// An organization with its employees.
  Get { id: Id },
  #[command(flatten)]
  Edit(Edit),
  List {
    #[arg(long)]
    search: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
  /// List the accepted event types.
  Types,
  Create {
    #[arg(long)]
    json:         String,
    #[arg(long = "participant")]
    participants: Vec<Id>,
  },
  /// An event with its participants.
  Get { id: Id },
  #[command(flatten)]
  Edit(Edit),
  List {
    #[arg(long = "type")]
    event_type: Option<EventType>,
  },
  AddParticipant {
    event:  Id,
    person: Id,
    #[arg(long)]
    role:   Option<String>,
  },
  RemoveParticipant { event: Id, person: Id },
}

#[derive(Subcommand, Debug)]
pub enum OccupationCommand {
  Create {
    person:       Id,
    #[arg(long)]
    json:         String,
    #[arg(long = "org")]
    organization: Option<Id>,
  },
  /// An occupation with its employer.
  Get { id: Id },
  #[command(flatten)]
  Edit(Edit),
  List,
  LinkOrg { occupation: Id, organization: Id },
  UnlinkOrg { occupation: Id, organization: Id },
}

#[derive(Subcommand, Debug)]
pub enum MediaCommand {
  /// Record media metadata (`filename`, `file_path`, `content_type`,
  /// `caption`).
  Create(Body),
  Get { id: Id },
  #[command(flatten)]
  Edit(Edit),
  List {
    #[arg(long)]
    category: Option<MediaCategory>,
  },
  Link { media: Id, person: Id },
  Unlink { media: Id, person: Id },
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct MarriageDates {
  start_date: Patch<String>,
  end_date:   Patch<String>,
}

fn parse<T: DeserializeOwned>(body: &str) -> anyhow::Result<T> {
  serde_json::from_str(body).context("invalid JSON body")
}

fn out<T: Serialize>(value: T) -> anyhow::Result<Value> {
  Ok(serde_json::to_value(value)?)
}

fn done() -> anyhow::Result<Value> { Ok(json!({ "status": "ok" })) }

async fn edit<E, S>(tree: &FamilyTree<S>, cmd: Edit) -> anyhow::Result<Value>
where
  E: Entity,
  E::Patch: DeserializeOwned,
  S: GraphStore,
{
  match cmd {
    Edit::Update { id, json } => out(tree.update::<E>(id, parse(&json)?).await?),
    Edit::Delete { id } => {
      tree.delete::<E>(id).await?;
      done()
    }
  }
}

/// Run one command against `tree` and return its JSON result.
pub async fn run<S: GraphStore>(tree: &FamilyTree<S>, cmd: Command) -> anyhow::Result<Value> {
  match cmd {
    Command::Person(cmd) => person(tree, cmd).await,
    Command::Parent(cmd) => parent(tree, cmd).await,
    Command::Spouse(cmd) => spouse(tree, cmd).await,
    Command::Graph => out(tree.whole_graph().await?),
    Command::Place(cmd) => place(tree, cmd).await,
    Command::Org(cmd) => org(tree, cmd).await,
    Command::Event(cmd) => event(tree, cmd).await,
    Command::Occupation(cmd) => occupation(tree, cmd).await,
    Command::Media(cmd) => media(tree, cmd).await,
  }
}

async fn person<S: GraphStore>(
  tree: &FamilyTree<S>,
  cmd: PersonCommand,
) -> anyhow::Result<Value> {
  match cmd {
    PersonCommand::Create(body) => out(tree.create_person(parse::<Person>(&body.json)?).await?),
    PersonCommand::Get { id } => out(tree.get_person(id).await?),
    PersonCommand::Edit(cmd) => edit::<Person, _>(tree, cmd).await,
    PersonCommand::List { name, birth_year, location, alive, limit, offset } => {
      let filter = PersonFilter { name, birth_year, location, alive, limit, offset };
      out(tree.list_people(filter).await?)
    }
    PersonCommand::Relationships { id } => out(tree.person_relationships(id).await?),
    PersonCommand::Ancestors { id, depth } => out(tree.ancestors_of(id, depth).await?),
    PersonCommand::Descendants { id, depth } => out(tree.descendants_of(id, depth).await?),
    PersonCommand::Events { id } => out(tree.person_events(id).await?),
    PersonCommand::Residences { id } => out(tree.person_residences(id).await?),
    PersonCommand::Occupations { id } => out(tree.person_occupations(id).await?),
    PersonCommand::Media { id } => out(tree.person_media(id).await?),
  }
}

async fn parent<S: GraphStore>(
  tree: &FamilyTree<S>,
  cmd: ParentCommand,
) -> anyhow::Result<Value> {
  match cmd {
    ParentCommand::Add { parent, child, kind, adoption_date } => {
      tree.add_parent_child(parent, child, kind, adoption_date).await?
    }
    ParentCommand::Change { parent, child, kind, adoption_date } => {
      tree.change_parent_child_kind(parent, child, kind, adoption_date).await?
    }
    ParentCommand::Remove { parent, child } => tree.remove_parent_child(parent, child).await?,
  }
  done()
}

async fn spouse<S: GraphStore>(
  tree: &FamilyTree<S>,
  cmd: SpouseCommand,
) -> anyhow::Result<Value> {
  match cmd {
    SpouseCommand::Add { a, b, start, end } => tree.add_spouse(a, b, start, end).await?,
    SpouseCommand::Update { a, b, json } => {
      let dates: MarriageDates = parse(&json)?;
      tree.update_spouse(a, b, dates.start_date, dates.end_date).await?
    }
    SpouseCommand::Remove { a, b } => tree.remove_spouse(a, b).await?,
  }
  done()
}

async fn place<S: GraphStore>(tree: &FamilyTree<S>, cmd: PlaceCommand) -> anyhow::Result<Value> {
  match cmd {
    PlaceCommand::Create(body) => out(tree.create(parse::<Place>(&body.json)?).await?),
    PlaceCommand::Get { id } => out(tree.place_detail(id).await?),
    PlaceCommand::Edit(cmd) => edit::<Place, _>(tree, cmd).await,
    PlaceCommand::List { search } => out(tree.list_places(search).await?),
    PlaceCommand::AddResident { place, person, start, end, residence_type } => {
      tree.add_residence(place, person, start, end, residence_type).await?;
      done()
    }
    PlaceCommand::RemoveResident { place, person } => {
      tree.remove_residence(place, person).await?;
      done()
    }
  }
}

async fn org<S: GraphStore>(tree: &FamilyTree<S>, cmd: OrgCommand) -> anyhow::Result<Value> {
  match cmd {
    OrgCommand::Create(body) => out(tree.create(parse::<Organization>(&body.json)?).await?),
    OrgCommand::Get { id } => out(tree.organization_detail(id).await?),
    OrgCommand::Edit(cmd) => edit::<Organization, _>(tree, cmd).await,
    OrgCommand::List { search } => out(tree.list_organizations(search).await?),
  }
}

async fn event<S: GraphStore>(tree: &FamilyTree<S>, cmd: EventCommand) -> anyhow::Result<Value> {
  match cmd {
    EventCommand::Types => out(tree.event_types()),
    EventCommand::Create { json, participants } => {
      out(tree.create_event(parse::<Event>(&json)?, &participants).await?)
    }
    EventCommand::Get { id } => out(tree.event_detail(id).await?),
    EventCommand::Edit(cmd) => edit::<Event, _>(tree, cmd).await,
    EventCommand::List { event_type } => out(tree.list_events(event_type).await?),
    EventCommand::AddParticipant { event, person, role } => {
      tree.add_participant(event, person, role).await?;
      done()
    }
    EventCommand::RemoveParticipant { event, person } => {
      tree.remove_participant(event, person).await?;
      done()
    }
  }
}

async fn occupation<S: GraphStore>(
  tree: &FamilyTree<S>,
  cmd: OccupationCommand,
) -> anyhow::Result<Value> {
  match cmd {
    OccupationCommand::Create { person, json, organization } => {
      let props = parse::<Occupation>(&json)?;
      out(tree.create_occupation(person, props, organization).await?)
    }
    OccupationCommand::Get { id } => out(tree.occupation_detail(id).await?),
    OccupationCommand::Edit(cmd) => edit::<Occupation, _>(tree, cmd).await,
    OccupationCommand::List => out(tree.list_occupations().await?),
    OccupationCommand::LinkOrg { occupation, organization } => {
      tree.link_occupation_organization(occupation, organization).await?;
      done()
    }
    OccupationCommand::UnlinkOrg { occupation, organization } => {
      tree.unlink_occupation_organization(occupation, organization).await?;
      done()
    }
  }
}

async fn media<S: GraphStore>(tree: &FamilyTree<S>, cmd: MediaCommand) -> anyhow::Result<Value> {
  match cmd {
    MediaCommand::Create(body) => out(tree.create_media(parse::<NewMedia>(&body.json)?).await?),
    MediaCommand::Get { id } => out(tree.get::<Media>(id).await?),
    MediaCommand::Edit(cmd) => edit::<Media, _>(tree, cmd).await,
    MediaCommand::List { category } => out(tree.list_media(category).await?),
    MediaCommand::Link { media, person } => {
      tree.link_media_person(media, person).await?;
      done()
    }
    MediaCommand::Unlink { media, person } => {
      tree.unlink_media_person(media, person).await?;
      done()
    }
  }
}
