//! In-memory user and group directory.
//!
//! A self-contained module used for local experimentation and by the
//! integration tests. Every invocation starts from the same seeded data.

use super::ServiceModule;
use crate::action::ActionDefinition;
use crate::auth::Session;
use crate::config::models::Profile;
use crate::constants::DEFAULT_PAGE_BUFFER;
use crate::engine::locator::{ServiceHandle, SubService};
use crate::engine::serializer::{Outcome, PageStream};
use crate::error::Error;
use crate::schema::{ArgumentSchema, FieldKind, FieldSpec, IntWidth};
use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub const SERVICE_NAME: &str = "directory";

const USER_STATUSES: &[&str] = &["active", "disabled"];
const MEMBER_ROLES: &[&str] = &["member", "owner"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_name: String,
    pub email: String,
    pub status: String,
    pub tags: Vec<String>,
    pub attributes: IndexMap<String, String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub group_name: String,
    pub description: String,
    pub max_members: i32,
    pub members: Vec<String>,
    pub policies: IndexMap<String, Policy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub effect: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    pub group: String,
    pub role: String,
}

// Argument records

/// Options shared by mutating operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    pub dry_run: bool,
}

impl ArgumentSchema for WriteOptions {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("dry_run", FieldKind::Bool)
            .help("Validate the request without applying it")]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUsersInput {
    pub page_size: u32,
    pub status: Option<String>,
    pub name_prefix: Option<String>,
    pub tags: Vec<String>,
}

impl ArgumentSchema for ListUsersInput {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("page_size", FieldKind::Uint(IntWidth::W32))
                .help("Users fetched per page")
                .default_value("2"),
            FieldSpec::new("status", FieldKind::String)
                .help("Only list users with this status")
                .choices(USER_STATUSES),
            FieldSpec::new("name_prefix", FieldKind::String)
                .help("Only list users whose name starts with this prefix"),
            FieldSpec::new("tags", FieldKind::StringList).help("Only list users carrying every tag"),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub user_name: String,
}

impl ArgumentSchema for UserInput {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("user_name", FieldKind::String)
            .help("Name of the user")
            .required()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserInput {
    pub user_name: String,
    pub email: String,
    pub status: String,
    pub tags: Vec<String>,
    pub attributes: IndexMap<String, String>,
    pub memberships: Vec<Membership>,
    #[serde(flatten)]
    pub options: WriteOptions,
}

impl ArgumentSchema for CreateUserInput {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("user_name", FieldKind::String)
                .help("Name of the new user")
                .required(),
            FieldSpec::new("email", FieldKind::String).help("Contact address"),
            FieldSpec::new("status", FieldKind::String)
                .help("Initial account status")
                .default_value("active")
                .choices(USER_STATUSES),
            FieldSpec::new("tags", FieldKind::StringList).help("Free-form labels"),
            FieldSpec::new("attributes", FieldKind::StringMap).help("Extra attributes as key=value"),
            FieldSpec::new("memberships", FieldKind::RecordList)
                .help(r#"Group memberships, e.g. [{"group": "admins", "role": "owner"}]"#),
            FieldSpec::embedded::<WriteOptions>(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteUserInput {
    pub user_name: String,
    #[serde(flatten)]
    pub options: WriteOptions,
}

impl ArgumentSchema for DeleteUserInput {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("user_name", FieldKind::String)
                .help("Name of the user to delete")
                .required(),
            FieldSpec::embedded::<WriteOptions>(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupInput {
    pub group_name: String,
}

impl ArgumentSchema for GroupInput {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("group_name", FieldKind::String)
            .help("Name of the group")
            .required()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateGroupInput {
    pub group_name: String,
    pub description: String,
    pub max_members: i32,
    pub policies: IndexMap<String, Policy>,
    #[serde(flatten)]
    pub options: WriteOptions,
}

impl ArgumentSchema for CreateGroupInput {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("group_name", FieldKind::String)
                .help("Name of the new group")
                .required(),
            FieldSpec::new("description", FieldKind::String),
            FieldSpec::new("max_members", FieldKind::Int(IntWidth::W32))
                .help("Membership limit")
                .default_value("100"),
            FieldSpec::new("policies", FieldKind::RecordMap).help(
                r#"Policies by name, e.g. {"read": {"effect": "allow", "actions": ["get"]}}"#,
            ),
            FieldSpec::embedded::<WriteOptions>(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddMemberInput {
    pub group_name: String,
    pub user_name: String,
    pub role: String,
}

impl ArgumentSchema for AddMemberInput {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("group_name", FieldKind::String).required(),
            FieldSpec::new("user_name", FieldKind::String).required(),
            FieldSpec::new("role", FieldKind::String)
                .default_value("member")
                .choices(MEMBER_ROLES),
        ]
    }
}

/// The seeded directory contents.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    users: Vec<User>,
    groups: Vec<Group>,
}

impl DirectoryStore {
    #[must_use]
    pub fn seeded() -> Self {
        let user = |name: &str, status: &str, tags: &[&str], groups: &[&str]| User {
            user_name: name.to_string(),
            email: format!("{name}@example.com"),
            status: status.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            attributes: IndexMap::new(),
            groups: groups.iter().map(|g| (*g).to_string()).collect(),
        };
        let users = vec![
            user("alice", "active", &["oncall"], &["admins", "engineering"]),
            user("bob", "active", &[], &["engineering"]),
            user("carol", "disabled", &["contractor"], &["sales"]),
            user("dave", "active", &["oncall", "contractor"], &["engineering"]),
        ];

        let mut admin_policies = IndexMap::new();
        admin_policies.insert(
            "everything".to_string(),
            Policy {
                effect: "allow".to_string(),
                actions: vec!["*".to_string()],
            },
        );
        let groups = ["admins", "engineering", "sales"]
            .into_iter()
            .map(|name| Group {
                group_name: name.to_string(),
                description: format!("The {name} team"),
                max_members: 100,
                members: users
                    .iter()
                    .filter(|u| u.groups.iter().any(|g| g == name))
                    .map(|u| u.user_name.clone())
                    .collect(),
                policies: if name == "admins" {
                    admin_policies.clone()
                } else {
                    IndexMap::new()
                },
            })
            .collect();

        Self { users, groups }
    }

    fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_name == name)
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.group_name == name)
    }
}

/// The built-in `directory` service module.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryModule;

impl ServiceModule for DirectoryModule {
    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(SERVICE_NAME)
            .alias("dir")
            .description("Manage users and groups in the directory")
            .version(env!("CARGO_PKG_VERSION"))
            .operation_without_args("WhoAmI")
            .child(
                ActionDefinition::new("users")
                    .alias("user")
                    .description("Manage directory users")
                    .operation::<ListUsersInput>("ListUsers")
                    .operation::<UserInput>("GetUser")
                    .operation::<UserInput>("UserExists")
                    .operation::<CreateUserInput>("CreateUser")
                    .operation::<DeleteUserInput>("DeleteUser")
                    .operation_without_args("CountUsers"),
            )
            .child(
                ActionDefinition::new("groups")
                    .alias("group")
                    .description("Manage directory groups")
                    .operation_without_args("ListGroups")
                    .operation::<GroupInput>("GetGroup")
                    .operation::<CreateGroupInput>("CreateGroup")
                    .operation::<AddMemberInput>("AddMember")
                    .operation::<GroupInput>("CountMembers"),
            )
    }

    fn connect(&self, profile: &Profile, sessions: &[Session]) -> Result<ServiceHandle, Error> {
        let store = Arc::new(DirectoryStore::seeded());
        let authenticators: Vec<String> = sessions.iter().map(|s| s.authenticator.clone()).collect();
        debug!(
            target: "portico::directory",
            "connected profile '{}' with {} session(s)",
            profile.name,
            sessions.len()
        );

        let identity = format!("{} ({})", profile.name, authenticators.join(", "));
        let root = SubService::new().operation_without_args("WhoAmI", move || {
            let identity = identity.clone();
            async move { Ok(vec![Outcome::text(identity)]) }
        });

        Ok(ServiceHandle::new(SERVICE_NAME)
            .sub_service("Directory", root)
            .sub_service("Users", users(&store))
            .sub_service("Groups", groups(&store)))
    }
}

fn users(store: &Arc<DirectoryStore>) -> SubService {
    let list = Arc::clone(store);
    let get = Arc::clone(store);
    let exists = Arc::clone(store);
    let create = Arc::clone(store);
    let delete = Arc::clone(store);
    let count = Arc::clone(store);

    SubService::new()
        .operation("ListUsers", move |args: ListUsersInput| {
            let store = Arc::clone(&list);
            async move { Ok(vec![Outcome::Stream(list_users(&store, &args))]) }
        })
        .operation("GetUser", move |args: UserInput| {
            let store = Arc::clone(&get);
            async move {
                let user = store
                    .user(&args.user_name)
                    .cloned()
                    .ok_or_else(|| anyhow!("user '{}' does not exist", args.user_name))?;
                Ok::<_, anyhow::Error>(vec![Outcome::record(user)])
            }
        })
        .operation("UserExists", move |args: UserInput| {
            let store = Arc::clone(&exists);
            async move { Ok(vec![Outcome::Bool(store.user(&args.user_name).is_some())]) }
        })
        .operation("CreateUser", move |args: CreateUserInput| {
            let store = Arc::clone(&create);
            async move {
                if store.user(&args.user_name).is_some() {
                    bail!("user '{}' already exists", args.user_name);
                }
                for membership in &args.memberships {
                    if store.group(&membership.group).is_none() {
                        bail!("group '{}' does not exist", membership.group);
                    }
                }
                let user = User {
                    email: if args.email.is_empty() {
                        format!("{}@example.com", args.user_name)
                    } else {
                        args.email
                    },
                    user_name: args.user_name,
                    status: args.status,
                    tags: args.tags,
                    attributes: args.attributes,
                    groups: args.memberships.into_iter().map(|m| m.group).collect(),
                };
                if args.options.dry_run {
                    return Ok(vec![Outcome::text(format!(
                        "Dry run: user '{}' would be created",
                        user.user_name
                    ))]);
                }
                Ok(vec![Outcome::record(user)])
            }
        })
        .operation("DeleteUser", move |args: DeleteUserInput| {
            let store = Arc::clone(&delete);
            async move {
                if store.user(&args.user_name).is_none() {
                    bail!("user '{}' does not exist", args.user_name);
                }
                if args.options.dry_run {
                    return Ok(vec![Outcome::text(format!(
                        "Dry run: user '{}' would be deleted",
                        args.user_name
                    ))]);
                }
                Ok(vec![Outcome::Empty])
            }
        })
        .operation_without_args("CountUsers", move || {
            let store = Arc::clone(&count);
            async move { Ok(vec![Outcome::Unsigned(store.users.len() as u64)]) }
        })
}

fn list_users(store: &DirectoryStore, args: &ListUsersInput) -> PageStream {
    let matching: Vec<User> = store
        .users
        .iter()
        .filter(|u| args.status.as_ref().is_none_or(|s| &u.status == s))
        .filter(|u| {
            args.name_prefix
                .as_ref()
                .is_none_or(|p| u.user_name.starts_with(p.as_str()))
        })
        .filter(|u| args.tags.iter().all(|t| u.tags.contains(t)))
        .cloned()
        .collect();
    let page_size = usize::try_from(args.page_size.max(1)).unwrap_or(usize::MAX);

    let (sender, stream) = PageStream::channel(DEFAULT_PAGE_BUFFER);
    tokio::spawn(async move {
        let pages = matching.chunks(page_size).count();
        for (index, chunk) in matching.chunks(page_size).enumerate() {
            let next = (index + 1 < pages).then_some(index + 1);
            if !sender.send(json!({ "users": chunk, "next_page": next })).await {
                break;
            }
        }
    });
    stream.items_field("users")
}

fn groups(store: &Arc<DirectoryStore>) -> SubService {
    let list = Arc::clone(store);
    let get = Arc::clone(store);
    let create = Arc::clone(store);
    let add = Arc::clone(store);
    let count = Arc::clone(store);

    SubService::new()
        .operation_without_args("ListGroups", move || {
            let store = Arc::clone(&list);
            async move {
                let (sender, stream) = PageStream::channel(DEFAULT_PAGE_BUFFER);
                let names: Vec<String> =
                    store.groups.iter().map(|g| g.group_name.clone()).collect();
                tokio::spawn(async move {
                    // One group name per page.
                    for name in names {
                        if !sender.send(json!([name])).await {
                            break;
                        }
                    }
                });
                Ok(vec![Outcome::Stream(stream)])
            }
        })
        .operation("GetGroup", move |args: GroupInput| {
            let store = Arc::clone(&get);
            async move { Ok(vec![Outcome::optional(store.group(&args.group_name).cloned())]) }
        })
        .operation("CreateGroup", move |args: CreateGroupInput| {
            let store = Arc::clone(&create);
            async move {
                if store.group(&args.group_name).is_some() {
                    bail!("group '{}' already exists", args.group_name);
                }
                if args.max_members < 1 {
                    bail!("max_members must be positive, got {}", args.max_members);
                }
                let group = Group {
                    group_name: args.group_name,
                    description: args.description,
                    max_members: args.max_members,
                    members: Vec::new(),
                    policies: args.policies,
                };
                if args.options.dry_run {
                    return Ok(vec![Outcome::text(format!(
                        "Dry run: group '{}' would be created",
                        group.group_name
                    ))]);
                }
                Ok(vec![Outcome::record(group)])
            }
        })
        .operation("AddMember", move |args: AddMemberInput| {
            let store = Arc::clone(&add);
            async move {
                let group = store
                    .group(&args.group_name)
                    .ok_or_else(|| anyhow!("group '{}' does not exist", args.group_name))?;
                if store.user(&args.user_name).is_none() {
                    bail!("user '{}' does not exist", args.user_name);
                }
                if group.members.contains(&args.user_name) {
                    return Ok(vec![Outcome::Bool(false)]);
                }
                debug!(
                    target: "portico::directory",
                    "adding {} to {} as {}",
                    args.user_name,
                    args.group_name,
                    args.role
                );
                Ok(vec![Outcome::Empty])
            }
        })
        .operation("CountMembers", move |args: GroupInput| {
            let store = Arc::clone(&count);
            async move {
                let group = store
                    .group(&args.group_name)
                    .ok_or_else(|| anyhow!("group '{}' does not exist", args.group_name))?;
                let members = i64::try_from(group.members.len())?;
                Ok::<_, anyhow::Error>(vec![Outcome::Integer(members)])
            }
        })
}
