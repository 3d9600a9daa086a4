// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier resolution
//!
//! [`resolve`] maps a raw token to candidate elements or candidate types.
//! [`SelectionResolver`] drives the rest of the interaction (type choice,
//! confirmation, instance picks) as a state machine fed with discrete
//! [`ResolverEvent`]s. It never loops on its own: invalid input returns an
//! error and leaves the state as it was, and the caller decides whether to
//! ask again.

use crate::error::ResolutionError;
use ifc_edit_model::{EntityId, EntityResolver};
use std::fmt;

/// What a token resolved to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidates {
    /// Numeric token: zero or one element
    Entities(Vec<EntityId>),
    /// Type fragment: matching type names, sorted ascending
    Types(Vec<String>),
}

/// Result of [`resolve`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub candidates: Candidates,
    pub diagnostic: Option<String>,
}

impl Resolution {
    fn found(candidates: Candidates) -> Self {
        Self {
            candidates,
            diagnostic: None,
        }
    }

    fn empty(candidates: Candidates, error: ResolutionError) -> Self {
        Self {
            candidates,
            diagnostic: Some(error.to_string()),
        }
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        match &self.candidates {
            Candidates::Entities(ids) => ids.is_empty(),
            Candidates::Types(types) => types.is_empty(),
        }
    }
}

/// Whether `token` is an element ID rather than a type fragment
pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a raw token against the store
pub fn resolve<S: EntityResolver + ?Sized>(store: &S, token: &str) -> Resolution {
    let token = token.trim();

    if is_numeric(token) {
        let found = token
            .parse::<u32>()
            .ok()
            .map(EntityId)
            .filter(|id| store.get(*id).is_some());
        return match found {
            Some(id) => Resolution::found(Candidates::Entities(vec![id])),
            None => Resolution::empty(
                Candidates::Entities(Vec::new()),
                ResolutionError::NoSuchId(token.to_string()),
            ),
        };
    }

    let types = matching_types(store, token);
    log::debug!("'{}' matches {} type(s)", token, types.len());
    if types.is_empty() {
        Resolution::empty(
            Candidates::Types(types),
            ResolutionError::NoTypesMatch(token.to_string()),
        )
    } else {
        Resolution::found(Candidates::Types(types))
    }
}

/// Sorted distinct type names present in the document
pub fn list_types<S: EntityResolver + ?Sized>(store: &S) -> Vec<String> {
    store.type_names()
}

/// Type names containing `fragment`, case-insensitively, sorted ascending
pub fn matching_types<S: EntityResolver + ?Sized>(store: &S, fragment: &str) -> Vec<String> {
    let needle = fragment.to_lowercase();
    store
        .type_names()
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect()
}

/// Instances of `type_name` in store order
pub fn instances_of<S: EntityResolver + ?Sized>(store: &S, type_name: &str) -> Vec<EntityId> {
    store
        .find_by_type_name(type_name)
        .iter()
        .map(|entity| entity.id)
        .collect()
}

/// Resolver progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolverState {
    AwaitToken,
    /// Several types matched; waiting for a 1-based choice
    Disambiguate { types: Vec<String> },
    /// Exactly one type matched; waiting for yes/no
    Confirm { type_name: String },
    /// Picking instances of the committed type
    PickInstances {
        type_name: String,
        instances: Vec<EntityId>,
        multi: bool,
        picked: Vec<EntityId>,
    },
    Resolved(Vec<EntityId>),
    Aborted,
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverState::AwaitToken => f.write_str("waiting for an identifier"),
            ResolverState::Disambiguate { .. } => f.write_str("choosing a type"),
            ResolverState::Confirm { .. } => f.write_str("confirming the type"),
            ResolverState::PickInstances { .. } => f.write_str("picking elements"),
            ResolverState::Resolved(_) => f.write_str("resolved"),
            ResolverState::Aborted => f.write_str("aborted"),
        }
    }
}

/// Input to the resolver
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolverEvent {
    /// A raw identifier (element ID or type fragment)
    Token(String),
    /// 1-based choice among the listed types
    Choose(usize),
    /// Answer to the single-match confirmation
    Confirm(bool),
    /// Switch between single and multi select before the first pick
    MultiSelect(bool),
    /// 1-based index, element ID, or exact name (case-insensitive)
    Pick(String),
    /// Finish a multi-select
    Done,
    Abort,
}

impl fmt::Display for ResolverEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverEvent::Token(t) | ResolverEvent::Pick(t) => f.write_str(t),
            ResolverEvent::Choose(n) => write!(f, "{}", n),
            ResolverEvent::Confirm(yes) => f.write_str(if *yes { "yes" } else { "no" }),
            ResolverEvent::MultiSelect(on) => write!(f, "multi-select {}", on),
            ResolverEvent::Done => f.write_str("done"),
            ResolverEvent::Abort => f.write_str("abort"),
        }
    }
}

/// Interactive selection as an explicit state machine
///
/// `AwaitToken -> (Disambiguate | Confirm) -> PickInstances -> Resolved`,
/// with a numeric token going straight to `Resolved`.
#[derive(Clone, Debug)]
pub struct SelectionResolver {
    state: ResolverState,
    auto_confirm: bool,
}

impl Default for SelectionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionResolver {
    pub fn new() -> Self {
        Self {
            state: ResolverState::AwaitToken,
            auto_confirm: false,
        }
    }

    /// Accept a single matching type without the `Confirm` step
    pub fn with_auto_confirm(mut self, enabled: bool) -> Self {
        self.auto_confirm = enabled;
        self
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Final selection, once resolved
    pub fn resolved(&self) -> Option<&[EntityId]> {
        match &self.state {
            ResolverState::Resolved(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            ResolverState::Resolved(_) | ResolverState::Aborted
        )
    }

    /// Feed one event
    ///
    /// On error the state is unchanged, except that declining the
    /// confirmation returns to `AwaitToken` with [`ResolutionError::Cancelled`].
    pub fn handle<S: EntityResolver + ?Sized>(
        &mut self,
        store: &S,
        event: ResolverEvent,
    ) -> Result<&ResolverState, ResolutionError> {
        let event = match event {
            ResolverEvent::Pick(input) if input.trim().eq_ignore_ascii_case("done") => {
                ResolverEvent::Done
            }
            event => event,
        };

        if event == ResolverEvent::Abort {
            self.state = ResolverState::Aborted;
            return Ok(&self.state);
        }
        if event == ResolverEvent::Confirm(false)
            && matches!(self.state, ResolverState::Confirm { .. })
        {
            self.state = ResolverState::AwaitToken;
            return Err(ResolutionError::Cancelled);
        }

        let next = match (&self.state, event) {
            (
                ResolverState::AwaitToken | ResolverState::Resolved(_) | ResolverState::Aborted,
                ResolverEvent::Token(token),
            ) => self.on_token(store, &token)?,

            (ResolverState::Disambiguate { types }, ResolverEvent::Choose(choice)) => {
                if choice == 0 || choice > types.len() {
                    return Err(ResolutionError::ChoiceOutOfRange {
                        choice,
                        max: types.len(),
                    });
                }
                enter_type(store, &types[choice - 1])?
            }

            (ResolverState::Confirm { type_name }, ResolverEvent::Confirm(true)) => {
                enter_type(store, type_name)?
            }

            (
                ResolverState::PickInstances {
                    type_name,
                    instances,
                    picked,
                    ..
                },
                ResolverEvent::MultiSelect(on),
            ) if picked.is_empty() => ResolverState::PickInstances {
                type_name: type_name.clone(),
                instances: instances.clone(),
                multi: on,
                picked: Vec::new(),
            },

            (ResolverState::PickInstances { picked, .. }, ResolverEvent::Done) => {
                if picked.is_empty() {
                    return Err(ResolutionError::NothingSelected);
                }
                ResolverState::Resolved(picked.clone())
            }

            (
                ResolverState::PickInstances {
                    type_name,
                    instances,
                    multi,
                    picked,
                },
                ResolverEvent::Pick(input),
            ) => {
                let id = pick(store, instances, &input)?;
                let mut picked = picked.clone();
                if !picked.contains(&id) {
                    picked.push(id);
                }
                if *multi {
                    ResolverState::PickInstances {
                        type_name: type_name.clone(),
                        instances: instances.clone(),
                        multi: true,
                        picked,
                    }
                } else {
                    ResolverState::Resolved(picked)
                }
            }

            (state, event) => {
                return Err(ResolutionError::UnexpectedInput {
                    input: event.to_string(),
                    state: state.to_string(),
                })
            }
        };

        log::debug!("Resolver: {} -> {}", self.state, next);
        self.state = next;
        Ok(&self.state)
    }

    fn on_token<S: EntityResolver + ?Sized>(
        &self,
        store: &S,
        token: &str,
    ) -> Result<ResolverState, ResolutionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ResolutionError::EmptyToken);
        }

        match resolve(store, token).candidates {
            Candidates::Entities(ids) if ids.is_empty() => {
                Err(ResolutionError::NoSuchId(token.to_string()))
            }
            Candidates::Entities(ids) => Ok(ResolverState::Resolved(ids)),
            Candidates::Types(types) => match types.len() {
                0 => Err(ResolutionError::NoTypesMatch(token.to_string())),
                1 if self.auto_confirm => enter_type(store, &types[0]),
                1 => Ok(ResolverState::Confirm {
                    type_name: types[0].clone(),
                }),
                _ => Ok(ResolverState::Disambiguate { types }),
            },
        }
    }
}

fn enter_type<S: EntityResolver + ?Sized>(
    store: &S,
    type_name: &str,
) -> Result<ResolverState, ResolutionError> {
    let instances = instances_of(store, type_name);
    if instances.is_empty() {
        return Err(ResolutionError::NoTypesMatch(type_name.to_string()));
    }
    Ok(ResolverState::PickInstances {
        type_name: type_name.to_string(),
        instances,
        multi: false,
        picked: Vec::new(),
    })
}

/// Resolve one pick against the enumerated instances
fn pick<S: EntityResolver + ?Sized>(
    store: &S,
    instances: &[EntityId],
    input: &str,
) -> Result<EntityId, ResolutionError> {
    let input = input.trim();

    if is_numeric(input) {
        let n: usize = input
            .parse()
            .map_err(|_| ResolutionError::InvalidPick(input.to_string()))?;
        if (1..=instances.len()).contains(&n) {
            return Ok(instances[n - 1]);
        }
        return u32::try_from(n)
            .ok()
            .map(EntityId)
            .filter(|id| instances.contains(id))
            .ok_or_else(|| ResolutionError::InvalidPick(input.to_string()));
    }

    let wanted = input.to_lowercase();
    let matches: Vec<EntityId> = instances
        .iter()
        .copied()
        .filter(|id| {
            store
                .get(*id)
                .and_then(|entity| entity.name().map(|name| name.to_lowercase() == wanted))
                .unwrap_or(false)
        })
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(ResolutionError::InvalidPick(input.to_string())),
        _ => Err(ResolutionError::AmbiguousName(input.to_string())),
    }
}
